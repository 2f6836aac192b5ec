use std::path::Path;

use anyhow::Context;
use naics_tree::Config;
use tracing::instrument;

use super::Settings;

#[derive(Debug, clap::Parser)]
/// Show or initialise the configuration
///
/// Configuration is read from naics.toml in the working directory, or from
/// the file given with --config.
///
/// Available configuration keys:
///   `root_label`        Label of the synthetic root node
///   `root_description`  Description of the synthetic root node
///   `max_depth`         Default maximum tree depth (default: 20)
///   source            Path to the classification table
pub struct Command {
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, clap::Parser)]
enum ConfigCommand {
    /// Show the effective configuration as TOML (default)
    Show,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Command {
    #[instrument(level = "debug", skip(self, settings))]
    pub fn run(self, settings: &Settings, path: &Path) -> anyhow::Result<()> {
        match self.command.unwrap_or(ConfigCommand::Show) {
            ConfigCommand::Show => {
                print!("{}", settings.config().to_toml()?);
                Ok(())
            }
            ConfigCommand::Init { force } => init(path, force, settings.config()),
        }
    }
}

fn init(path: &Path, force: bool, current: &Config) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let mut config = Config::default();
    config.source.clone_from(&current.source);
    config
        .save(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    println!("Created {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn init_writes_defaults_and_keeps_source() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("naics.toml");

        let mut current = Config::default();
        current.source = Some(PathBuf::from("naics.xlsx"));
        current.set_max_depth(2);
        init(&path, false, &current).unwrap();

        let written = Config::load(&path).unwrap();
        assert_eq!(written.source, Some(PathBuf::from("naics.xlsx")));
        assert_eq!(written.max_depth(), Config::default().max_depth());
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("naics.toml");
        std::fs::write(&path, "_version = \"1\"\n").unwrap();

        assert!(init(&path, false, &Config::default()).is_err());
        assert!(init(&path, true, &Config::default()).is_ok());
    }
}
