use std::io;

use clap::Parser;
use naics_tree::Record;
use tracing::instrument;

use super::Settings;

#[derive(Debug, Parser)]
#[command(about = "Print the cleaned classification table")]
pub struct Table {
    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "csv")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// Comma-separated values with a `Code,Title,Description` header
    #[default]
    Csv,
    /// A JSON array of row objects
    Json,
}

impl Table {
    #[instrument(level = "debug", skip(self, settings))]
    pub fn run(self, settings: &Settings) -> anyhow::Result<()> {
        let table = settings.accessor()?.table()?;

        match self.output {
            OutputFormat::Csv => write_csv(table.records(), io::stdout().lock())?,
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&table)?),
        }

        Ok(())
    }
}

fn write_csv(records: &[Record], writer: impl io::Write) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
