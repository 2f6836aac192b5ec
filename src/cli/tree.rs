use std::fmt::Write as _;

use clap::Parser;
use naics_tree::{Code, Node};
use tracing::instrument;

use super::{
    Settings,
    terminal::{self, Colorize},
};

#[derive(Debug, Parser)]
#[command(about = "Print the classification tree")]
pub struct Tree {
    /// Maximum number of levels below the root [default: from configuration]
    #[arg(short = 'd', long)]
    max_depth: Option<usize>,

    /// Start from this code instead of the synthetic root
    #[arg(long, value_name = "CODE")]
    from: Option<Code>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "json")]
    output: OutputFormat,

    /// Include descriptions in pretty output
    #[arg(long)]
    descriptions: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// JSON in the shape expected by tree widgets
    #[default]
    Json,
    /// YAML with the same structure as JSON
    Yaml,
    /// An indented, human-readable outline
    Pretty,
}

impl Tree {
    #[instrument(level = "debug", skip(self, settings))]
    pub fn run(self, settings: &Settings) -> anyhow::Result<()> {
        let accessor = settings.accessor()?;
        let max_depth = self
            .max_depth
            .unwrap_or_else(|| settings.config().max_depth());

        let tree = match self.from {
            Some(code) => accessor.subtree(code, max_depth)?,
            None => accessor.get_tree(max_depth)?,
        };

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tree)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&tree)?),
            OutputFormat::Pretty => {
                let style = Style {
                    color: terminal::supports_color(),
                    width: terminal::terminal_width().map(usize::from),
                    descriptions: self.descriptions,
                };
                print!("{}", render(&tree, style));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct Style {
    color: bool,
    width: Option<usize>,
    descriptions: bool,
}

/// Renders a tree as an outline with box-drawing guides.
fn render(tree: &Node, style: Style) -> String {
    let mut out = String::new();
    push_line(&mut out, "", &tree.label, style);
    render_children(&mut out, tree, "", style);
    out
}

fn render_children(out: &mut String, node: &Node, prefix: &str, style: Style) {
    let count = node.children.len();
    for (index, child) in node.children.iter().enumerate() {
        let (branch, continuation) = if index + 1 == count {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };

        push_line(out, &format!("{prefix}{branch}"), &child.label, style);

        let child_prefix = format!("{prefix}{continuation}");
        if style.descriptions {
            let guide = if child.is_leaf() { "    " } else { "│   " };
            let description_prefix = format!("{child_prefix}{guide}");
            for line in child.description.lines().map(str::trim).filter(|l| !l.is_empty()) {
                let line = truncate(line, available(style.width, &description_prefix));
                let _ = writeln!(
                    out,
                    "{}{}",
                    description_prefix.dim_if(style.color),
                    line.dim_if(style.color)
                );
            }
        }

        render_children(out, child, &child_prefix, style);
    }
}

/// Appends one node line. The code part of a `"{code}: {title}"` label is
/// highlighted, and the title is truncated to fit `style.width`.
fn push_line(out: &mut String, guide: &str, label: &str, style: Style) {
    let (code, title) = match label.split_once(": ") {
        Some((code, title)) if code.parse::<Code>().is_ok() => (Some(code), title),
        _ => (None, label),
    };

    let used = code.map_or(0, |code| code.chars().count() + 2);
    let title = truncate(title, available(style.width, guide).map(|w| w.saturating_sub(used)));

    let _ = match code {
        Some(code) => writeln!(
            out,
            "{}{}: {title}",
            guide.dim_if(style.color),
            code.code_if(style.color)
        ),
        None => writeln!(out, "{}{title}", guide.dim_if(style.color)),
    };
}

/// Columns left on a line after `prefix`.
fn available(width: Option<usize>, prefix: &str) -> Option<usize> {
    width.map(|width| width.saturating_sub(prefix.chars().count()))
}

/// Shortens `text` to at most `width` characters, ending in `…` when cut.
fn truncate(text: &str, width: Option<usize>) -> String {
    match width {
        Some(width) if text.chars().count() > width => {
            let mut truncated: String = text.chars().take(width.saturating_sub(1)).collect();
            if width > 0 {
                truncated.push('…');
            }
            truncated
        }
        _ => text.to_string(),
    }
}
