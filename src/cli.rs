use std::path::{Path, PathBuf};

mod children;
mod config;
mod table;
mod terminal;
mod tree;

use anyhow::Context;
use clap::ArgAction;
use naics_tree::{Config, FileSource, TreeAccessor};
use tracing::{debug, instrument};

/// Configuration file picked up from the working directory when `--config`
/// is not given.
const DEFAULT_CONFIG: &str = "naics.toml";

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the configuration file [default: naics.toml, if present]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the classification table (.xlsx, .xls, .ods, .csv or .json)
    ///
    /// Overrides the `source` set in the configuration file.
    #[arg(short, long, global = true)]
    source: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config_path = self.config.clone();
        let settings = Settings::load(self.config.as_deref(), self.source)?;

        match self.command {
            Command::Tree(command) => command.run(&settings),
            Command::Table(command) => command.run(&settings),
            Command::Children(command) => command.run(&settings),
            Command::Config(command) => {
                command.run(&settings, config_path.as_deref().unwrap_or(Path::new(DEFAULT_CONFIG)))
            }
        }
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Print the classification tree
    Tree(tree::Tree),

    /// Print the cleaned classification table
    Table(table::Table),

    /// List the direct children of a code
    ///
    /// The sectors 31, 44 and 48 span several two-digit codes and have a
    /// wider range of children than other codes.
    Children(children::Children),

    /// Show or initialise the configuration
    Config(config::Command),
}

/// Effective settings for a single invocation.
#[derive(Debug)]
pub struct Settings {
    config: Config,
}

impl Settings {
    /// Loads the configuration and applies command-line overrides.
    ///
    /// An explicitly requested configuration file must exist; the default
    /// `naics.toml` is only read if present.
    #[instrument(level = "debug")]
    fn load(config: Option<&Path>, source: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut config = match config {
            Some(path) => Config::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None if Path::new(DEFAULT_CONFIG).exists() => Config::load(Path::new(DEFAULT_CONFIG))
                .with_context(|| format!("failed to load {DEFAULT_CONFIG}"))?,
            None => Config::default(),
        };

        if source.is_some() {
            config.source = source;
        }

        debug!(?config, "effective configuration");
        Ok(Self { config })
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Opens an accessor over the configured source.
    pub fn accessor(&self) -> anyhow::Result<TreeAccessor<FileSource>> {
        let path = self.config.source.as_ref().context(
            "no classification table given; pass --source or set `source` in the configuration",
        )?;
        let source = FileSource::open(path)?;
        Ok(TreeAccessor::from_config(source, &self.config))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::{CommandFactory, Parser};

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["naics", "tree", "-vv", "--source", "naics.xlsx"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.source, Some(PathBuf::from("naics.xlsx")));
        assert!(matches!(cli.command, Command::Tree(_)));
    }

    #[test]
    fn source_flag_overrides_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nsource = \"from-config.csv\"\nmax_depth = 2\n")
            .unwrap();

        let settings =
            Settings::load(Some(file.path()), Some(PathBuf::from("from-flag.json"))).unwrap();
        assert_eq!(
            settings.config().source,
            Some(PathBuf::from("from-flag.json"))
        );
        assert_eq!(settings.config().max_depth(), 2);
    }

    #[test]
    fn explicit_config_must_exist() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");
        assert!(Settings::load(Some(&missing), None).is_err());
    }

    #[test]
    fn accessor_requires_a_source() {
        let settings = Settings {
            config: Config::default(),
        };
        assert!(settings.accessor().is_err());
    }
}
