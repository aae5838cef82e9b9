pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "filegate")]
#[command(about = "Browse and download a directory tree over HTTP")]
pub struct Args {
    /// Server probed by `health` (defaults to the configured port on localhost)
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// Path to the filegate config directory (defaults to ~/.filegate)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
