use clap::Parser;
use naics_tree::{Code, Table};
use tracing::instrument;

use super::{
    Settings,
    terminal::{self, Colorize},
};

#[derive(Debug, Parser)]
#[command(about = "List the direct children of a code")]
pub struct Children {
    /// The parent code (0 for the synthetic root)
    code: Code,

    /// Print only the child codes, one per line
    #[arg(long)]
    keys_only: bool,
}

impl Children {
    #[instrument(level = "debug", skip(self, settings), fields(code = %self.code))]
    pub fn run(self, settings: &Settings) -> anyhow::Result<()> {
        let table = settings.accessor()?.table()?;

        if self.keys_only {
            for key in table.child_keys(self.code) {
                println!("{key}");
            }
        } else {
            print!("{}", describe(&table, self.code, terminal::supports_color()));
        }

        Ok(())
    }
}

fn describe(table: &Table, code: Code, color: bool) -> String {
    use std::fmt::Write as _;

    let range = code.child_range();
    let children = table.children(code);

    let mut out = String::new();
    let heading = format!(
        "Children of {code} (codes {}..{}): {}",
        range.start,
        range.end,
        children.len()
    );
    let _ = writeln!(out, "{}", heading.heading_if(color));
    for child in &children {
        let _ = match child.title.split_once(": ") {
            Some((code, title)) => writeln!(out, "  • {}: {title}", code.code_if(color)),
            None => writeln!(out, "  • {}", child.title),
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use naics_tree::{RawRecord, RawTable};

    use super::*;

    #[test]
    fn describes_sector_range() {
        let table = RawTable::new(vec![
            RawRecord::new("31-33", "Manufacturing", ""),
            RawRecord::new("311", "Food ManufacturingT", ""),
            RawRecord::new("332", "Fabricated Metal Product ManufacturingT", ""),
            RawRecord::new("3111", "Animal Food Manufacturing", ""),
        ])
        .normalize()
        .unwrap();

        assert_eq!(
            describe(&table, Code::new(31), false),
            "Children of 31 (codes 310..340): 2\n  \
             • 311: Food Manufacturing\n  \
             • 332: Fabricated Metal Product Manufacturing\n"
        );
    }

    #[test]
    fn describes_leaf() {
        let table = RawTable::new(vec![RawRecord::new("3111", "Animal Food", "")])
            .normalize()
            .unwrap();

        assert_eq!(
            describe(&table, Code::new(3111), false),
            "Children of 3111 (codes 31110..31120): 0\n"
        );
    }
}
