use crate::{
    assets::AssetResolver,
    context::BuildContext,
    plist::Document,
    project::NativeProject,
    step::{self, BuildStep, Pass},
};
use std::path::Path;

/// The machine a build pass runs on.
pub trait Host {
    /// Whether native projects can be edited here. When they can't, every
    /// registered step is inert.
    fn native_project_available(&self) -> bool;
}

/// Native projects are only editable on macOS unless the caller says
/// otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalHost {
    pub force_available: bool,
}

impl Host for LocalHost {
    fn native_project_available(&self) -> bool {
        self.force_available || cfg!(target_os = "macos")
    }
}

/// The documents a build pass hands to its steps.
pub struct Documents<'a> {
    pub entitlements: &'a mut Document,
    pub project: &'a mut dyn NativeProject,
    pub export_options: &'a mut Document,
}

/// Registered steps, run in registration order for each phase.
#[derive(Default)]
pub struct Pipeline<'a> {
    steps: Vec<Box<dyn BuildStep + 'a>>,
}

impl<'a> Pipeline<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, step: impl BuildStep + 'a) -> &mut Self {
        log::debug!("registered build step {:?}", step.display_name());
        self.steps.push(Box::new(step));
        self
    }

    pub fn steps(&self) -> impl Iterator<Item = &(dyn BuildStep + 'a)> {
        self.steps.iter().map(|step| &**step)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs a full pass: every step's entitlements hook, then every step's
    /// frameworks hook, then every step's export options hook. Stops at the
    /// first failure.
    ///
    /// Returns `false` without touching any document when `host` can't edit
    /// native projects.
    pub fn run(
        &self,
        host: &dyn Host,
        context: &BuildContext,
        output_dir: &Path,
        assets: &dyn AssetResolver,
        documents: Documents<'_>,
    ) -> Result<bool, step::Error> {
        if !host.native_project_available() {
            log::warn!(
                "native project editing isn't available on this host; skipping {} build step(s)",
                self.len()
            );
            return Ok(false);
        }
        let pass = Pass {
            context,
            output_dir,
            assets,
        };
        let Documents {
            entitlements,
            project,
            export_options,
        } = documents;
        log::info!(
            "processing {} {} build for {}",
            context.target(),
            context.profile().as_str(),
            context.bundle_identifier()
        );
        for step in self.steps() {
            log::debug!("{}: processing entitlements", step.display_name());
            step.process_entitlements(&pass, entitlements)?;
        }
        for step in self.steps() {
            log::debug!("{}: processing frameworks", step.display_name());
            step.process_frameworks(&pass, project)?;
        }
        for step in self.steps() {
            log::debug!("{}: processing export options", step.display_name());
            step.process_export_options(&pass, export_options)?;
        }
        Ok(true)
    }
}
