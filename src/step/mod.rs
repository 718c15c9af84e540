mod cloudkit;

pub use self::cloudkit::*;

use crate::{
    assets::AssetResolver, context::BuildContext, plist::Document, project::NativeProject,
};
use std::path::Path;
use thiserror::Error;

/// Collaborator failures surfaced while a step runs. Steps don't add
/// failures of their own.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    ProjectFailed(#[from] crate::project::Error),
}

/// Everything a step gets handed for one hook call.
pub struct Pass<'a> {
    pub context: &'a BuildContext,
    pub output_dir: &'a Path,
    pub assets: &'a dyn AssetResolver,
}

/// A pluggable post-processing step. The host calls each hook once per
/// build pass: entitlements before signing, frameworks before linking, and
/// export options before the archive is exported.
pub trait BuildStep {
    fn display_name(&self) -> &str;

    fn display_icon(&self) -> &str;

    fn process_entitlements(
        &self,
        _pass: &Pass<'_>,
        _entitlements: &mut Document,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn process_frameworks(
        &self,
        _pass: &Pass<'_>,
        _project: &mut dyn NativeProject,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn process_export_options(
        &self,
        _pass: &Pass<'_>,
        _export_options: &mut Document,
    ) -> Result<(), Error> {
        Ok(())
    }
}
