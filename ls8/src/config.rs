use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, PartialEq, Eq)]
#[command(name = "ls8", about = "Run an LS-8 program.")]
pub struct Config {
    /// Program file: one binary literal per line, `#` starts a comment.
    #[arg(value_name = "PATH")]
    pub program_path: PathBuf,

    /// Give up after this many instructions instead of waiting for HLT.
    #[arg(long, value_name = "N")]
    pub max_steps: Option<u64>,
}
