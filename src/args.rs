use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

#[derive(Parser)]
#[command(name = "cleandns")]
#[command(about = "Canonicalize DNS zone files: dedup, sort, serial bump, atomic rewrite")]
pub struct Cli {
    /// Zone files to process
    #[arg(
        short,
        long,
        value_name = "FILE",
        num_args = 1..,
        required_unless_present = "list",
        conflicts_with = "list"
    )]
    pub files: Vec<PathBuf>,

    /// Text file with one zone file path per line
    #[arg(short, long, value_name = "FILE")]
    pub list: Option<PathBuf>,

    /// Preserve comments in the rewritten files (reserved, comments are
    /// currently dropped)
    #[arg(long)]
    pub keep_comments: bool,
}

impl Cli {
    /// Resolve the input into a concrete list of paths. With `--list`,
    /// blank lines and `#` comment lines in the list file are ignored.
    pub fn resolve_files(&self) -> Result<Vec<PathBuf>> {
        match &self.list {
            Some(list) => {
                let content = fs::read_to_string(list)
                    .with_context(|| format!("failed to read file list {}", list.display()))?;
                Ok(content
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty() && !line.starts_with('#'))
                    .map(PathBuf::from)
                    .collect())
            }
            None => Ok(self.files.clone()),
        }
    }
}
