use crate::{
    assets::{self, AssetIndex},
    config::{self, Config, DEFAULT_FILE_NAME},
    context::BuildContext,
    opts,
    pipeline::{Documents, Host as _, LocalHost, Pipeline},
    plist::{self, Document},
    project::{self, StagedProject},
    step::{self, CloudKitStep},
    target::BuildTarget,
    NAME,
};
use colored::Colorize as _;
use std::path::{Path, PathBuf};
use structopt::{
    clap::{self, AppSettings},
    StructOpt,
};
use thiserror::Error;

pub static SETTINGS: &[AppSettings] = &[
    AppSettings::ColoredHelp,
    AppSettings::DeriveDisplayOrder,
    AppSettings::SubcommandRequiredElseHelp,
    AppSettings::VersionlessSubcommands,
];

pub static DEFAULT_ENTITLEMENTS_FILE_NAME: &str = "App.entitlements";
pub static DEFAULT_EXPORT_OPTIONS_FILE_NAME: &str = "ExportOptions.plist";
pub static DEFAULT_PROJECT_FILE_NAME: &str = "cloudkit-project.json";

pub fn bin_name(name: &str) -> String {
    format!("cargo {}", name)
}

pub type TextWrapper = textwrap::Wrapper<'static, textwrap::NoHyphenation>;

#[derive(Clone, Copy, Debug, StructOpt)]
pub struct GlobalFlags {
    #[structopt(
        short = "v",
        long = "verbose",
        help = "Make life louder",
        global = true,
        multiple = true,
        parse(from_occurrences = opts::NoiseLevel::from_occurrences),
    )]
    pub noise_level: opts::NoiseLevel,
}

#[derive(Clone, Copy, Debug, StructOpt)]
pub struct Clobbering {
    #[structopt(
        long = "force",
        help = "Overwrite an existing build profile",
        parse(from_flag = opts::Clobbering::from_flag),
    )]
    pub clobbering: opts::Clobbering,
}

#[derive(Clone, Copy, Debug, StructOpt)]
pub struct Profile {
    #[structopt(
        long = "release",
        help = "Process a release build instead of a debug build",
        parse(from_flag = opts::Profile::from_flag),
    )]
    pub profile: opts::Profile,
}

#[derive(Debug, StructOpt)]
#[structopt(bin_name = bin_name(NAME), settings = SETTINGS)]
pub struct Input {
    #[structopt(flatten)]
    flags: GlobalFlags,
    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
pub struct Apply {
    #[structopt(long = "config", help = "Build profile to read", default_value = DEFAULT_FILE_NAME)]
    config: PathBuf,
    #[structopt(long = "target", help = "Platform being built", default_value = "ios")]
    target: BuildTarget,
    #[structopt(flatten)]
    profile: Profile,
    #[structopt(long = "bundle-id", help = "Application bundle identifier")]
    bundle_identifier: String,
    #[structopt(long = "team", help = "Apple development team ID")]
    development_team: Option<String>,
    #[structopt(
        long = "output-dir",
        help = "Directory of the built player",
        default_value = "."
    )]
    output_dir: PathBuf,
    #[structopt(long = "entitlements", help = "Entitlements file to update")]
    entitlements: Option<PathBuf>,
    #[structopt(long = "export-options", help = "Export options plist to update")]
    export_options: Option<PathBuf>,
    #[structopt(long = "project", help = "Native project record to update")]
    project: Option<PathBuf>,
    #[structopt(long = "assets", help = "Asset index used to find prebuilt frameworks")]
    assets: Option<PathBuf>,
    #[structopt(
        long = "any-host",
        help = "Run even where native projects usually can't be edited"
    )]
    any_host: bool,
}

#[derive(Debug, StructOpt)]
pub enum Command {
    #[structopt(name = "init", about = "Writes a build profile with default CloudKit settings")]
    Init {
        #[structopt(long = "config", default_value = DEFAULT_FILE_NAME)]
        config: PathBuf,
        #[structopt(flatten)]
        clobbering: Clobbering,
    },
    #[structopt(
        name = "apply",
        about = "Runs a build pass over entitlements, frameworks, and export options"
    )]
    Apply(Apply),
    #[structopt(name = "targets", about = "Lists known build targets")]
    Targets,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    ConfigLoadFailed(#[from] config::LoadError),
    #[error(transparent)]
    ConfigWriteFailed(#[from] config::WriteError),
    #[error(transparent)]
    AssetsLoadFailed(#[from] assets::Error),
    #[error(transparent)]
    DocumentFailed(#[from] plist::Error),
    #[error(transparent)]
    ProjectFailed(#[from] project::Error),
    #[error("CloudKit build step failed: {0}")]
    StepFailed(#[from] step::Error),
}

pub trait ExecError: std::fmt::Debug + std::fmt::Display {
    fn code(&self) -> i8 {
        1
    }

    fn color(&self) -> colored::Color {
        colored::Color::BrightRed
    }
}

impl ExecError for Error {}

fn apply(args: Apply) -> Result<(), Error> {
    let Apply {
        config,
        target,
        profile: Profile { profile },
        bundle_identifier,
        development_team,
        output_dir,
        entitlements,
        export_options,
        project,
        assets,
        any_host,
    } = args;

    let host = LocalHost {
        force_available: any_host,
    };
    if !host.native_project_available() {
        log::warn!(
            "native project editing isn't available on this host; pass `--any-host` to run anyway"
        );
        return Ok(());
    }

    let config = Config::load(&config)?;
    let context = BuildContext::new(
        target,
        profile,
        bundle_identifier,
        development_team.unwrap_or_default(),
    );
    if config.use_key_value_store() && context.development_team().is_empty() {
        log::warn!("`--team` not given; `$(TeamIdentifierPrefix)` will expand to nothing");
    }

    let in_output_dir = |path: Option<PathBuf>, default: &str| {
        path.unwrap_or_else(|| output_dir.join(default))
    };
    let entitlements_path = in_output_dir(entitlements, DEFAULT_ENTITLEMENTS_FILE_NAME);
    let export_options_path = in_output_dir(export_options, DEFAULT_EXPORT_OPTIONS_FILE_NAME);
    let project_path = in_output_dir(project, DEFAULT_PROJECT_FILE_NAME);

    let assets = match assets {
        Some(path) => AssetIndex::load(path)?,
        None => {
            log::info!("no asset index given; prebuilt frameworks won't be embedded");
            AssetIndex::default()
        }
    };

    let mut entitlements = Document::load_or_default(&entitlements_path)?;
    let mut export_options = Document::load_or_default(&export_options_path)?;
    let mut project = StagedProject::load_or_default(&project_path)?;

    let mut pipeline = Pipeline::new();
    pipeline.register(CloudKitStep::new(config));
    let ran = pipeline.run(
        &host,
        &context,
        &output_dir,
        &assets,
        Documents {
            entitlements: &mut entitlements,
            project: &mut project,
            export_options: &mut export_options,
        },
    )?;
    if !ran {
        return Ok(());
    }

    save_document(&entitlements, &entitlements_path)?;
    save_document(&export_options, &export_options_path)?;
    project.save(&project_path)?;
    for (destination, embed) in project.embeds() {
        log::info!("{:?} embeds {:?} for {}", destination, embed.source, embed.target);
    }
    for (name, link) in project.frameworks() {
        log::info!(
            "{} is linked{} for {:?}",
            name,
            if link.weak { " weakly" } else { "" },
            link.targets
        );
    }
    Ok(())
}

fn save_document(document: &Document, path: &Path) -> Result<(), Error> {
    if document.is_empty() && !path.exists() {
        log::debug!("nothing to write to {:?}", path);
        return Ok(());
    }
    document.save(path)?;
    log::info!("wrote {:?}", path);
    Ok(())
}

impl Input {
    pub fn noise_level(&self) -> opts::NoiseLevel {
        self.flags.noise_level
    }

    pub fn exec(self) -> Result<(), Error> {
        match self.command {
            Command::Init {
                config,
                clobbering: Clobbering { clobbering },
            } => {
                Config::default().write(&config, clobbering)?;
                println!("Wrote default CloudKit settings to {}", config.display());
                Ok(())
            }
            Command::Apply(args) => apply(args),
            Command::Targets => {
                for target in BuildTarget::all() {
                    let name = target.name();
                    if *target == BuildTarget::DEFAULT {
                        println!("  {} ({})", name.bright_green().bold(), target);
                    } else {
                        println!("  {} ({})", name.green(), target);
                    }
                }
                Ok(())
            }
        }
    }
}

fn get_args(name: &str) -> Vec<String> {
    let mut args: Vec<String> = std::env::args().collect();
    // Running this as a cargo subcommand gives us our name as an argument,
    // so let's just discard that...
    if args.get(1).map(String::as_str) == Some(name) {
        args.remove(1);
    }
    args
}

fn init_logging(noise_level: opts::NoiseLevel) {
    use env_logger::{Builder, Env};
    let default_level = match noise_level {
        opts::NoiseLevel::Polite => "warn",
        opts::NoiseLevel::LoudAndProud => "apple_cloudkit=info",
        opts::NoiseLevel::FranklyQuitePedantic => "debug",
    };
    let env = Env::default().default_filter_or(default_level);
    Builder::from_env(env).init();
}

#[derive(Debug)]
enum Exit {
    Display(String, i8, colored::Color),
    Clap(clap::Error),
}

impl Exit {
    fn display(err: impl ExecError) -> Self {
        Self::Display(err.to_string(), err.code(), err.color())
    }

    fn do_the_thing(self, wrapper: &TextWrapper) -> ! {
        match self {
            Self::Display(err, code, color) => {
                eprintln!("{}", wrapper.fill(&err).color(color));
                // We only expose access to the 8 lsb of the exit code, since:
                // https://doc.rust-lang.org/std/process/fn.exit.html#platform-specific-behavior
                std::process::exit(code as i32)
            }
            Self::Clap(err) => err.exit(),
        }
    }
}

pub fn exec(name: &str) {
    let wrapper = TextWrapper::with_splitter(textwrap::termwidth(), textwrap::NoHyphenation);
    let result = Input::from_iter_safe(get_args(name))
        .map_err(Exit::Clap)
        .and_then(|input| {
            init_logging(input.noise_level());
            input.exec().map_err(Exit::display)
        });
    if let Err(exit) = result {
        exit.do_the_thing(&wrapper)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(args: &[&str]) -> Input {
        Input::from_iter_safe(std::iter::once("cargo-cloudkit").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn parses_apply() {
        let input = parse(&[
            "-vv",
            "apply",
            "--target",
            "tvos",
            "--release",
            "--bundle-id",
            "com.studio.game",
            "--team",
            "ABCDE12345",
        ]);
        assert_eq!(input.noise_level(), opts::NoiseLevel::FranklyQuitePedantic);
        match input.command {
            Command::Apply(args) => {
                assert_eq!(args.target, BuildTarget::TvOs);
                assert_eq!(args.profile.profile, opts::Profile::Release);
                assert_eq!(args.bundle_identifier, "com.studio.game");
                assert_eq!(args.development_team.as_deref(), Some("ABCDE12345"));
                assert_eq!(args.config, PathBuf::from(DEFAULT_FILE_NAME));
                assert!(!args.any_host);
            }
            other => panic!("expected `apply`, got {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_target() {
        let result = Input::from_iter_safe(vec![
            "cargo-cloudkit",
            "apply",
            "--target",
            "watchos",
            "--bundle-id",
            "com.studio.game",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn apply_writes_documents() {
        let dir = std::env::temp_dir().join(format!("{}-cli-apply-{}", NAME, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let config_path = dir.join("cloudkit.toml");
        std::fs::write(
            &config_path,
            "[cloudkit]\nuse-containers = true\ncontainer-identifiers = [\"iCloud.$(CFBundleIdentifier)\"]\n",
        )
        .unwrap();
        let input = parse(&[
            "apply",
            "--config",
            config_path.to_str().unwrap(),
            "--bundle-id",
            "com.studio.game",
            "--output-dir",
            dir.to_str().unwrap(),
            "--any-host",
        ]);
        input.exec().unwrap();

        let entitlements = Document::load(dir.join(DEFAULT_ENTITLEMENTS_FILE_NAME)).unwrap();
        let export_options = Document::load(dir.join(DEFAULT_EXPORT_OPTIONS_FILE_NAME)).unwrap();
        let project = StagedProject::load_or_default(dir.join(DEFAULT_PROJECT_FILE_NAME)).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(
            entitlements.get_string_array(step::ICLOUD_CONTAINER_IDENTIFIERS_KEY),
            Some(vec!["iCloud.com.studio.game"])
        );
        assert_eq!(
            entitlements.get_string(step::ICLOUD_CONTAINER_ENVIRONMENT_KEY),
            Some("Development")
        );
        assert_eq!(
            export_options.get_string(step::EXPORT_CONTAINER_ENVIRONMENT_KEY),
            Some("Development")
        );
        assert!(project.framework(step::CLOUDKIT_SYSTEM_FRAMEWORK).is_some());
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn apply_without_editable_project_writes_nothing() {
        let dir = std::env::temp_dir().join(format!("{}-cli-inert-{}", NAME, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = parse(&[
            "apply",
            "--config",
            dir.join("cloudkit.toml").to_str().unwrap(),
            "--bundle-id",
            "com.studio.game",
            "--output-dir",
            dir.to_str().unwrap(),
        ]);
        input.exec().unwrap();

        let written = std::fs::read_dir(&dir).unwrap().count();
        std::fs::remove_dir_all(&dir).unwrap();
        assert_eq!(written, 0);
    }
}
