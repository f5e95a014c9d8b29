use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

/// Painter text-to-image backend
#[derive(Debug, Parser)]
#[command(name = "painter", about = "Generate images from text prompts and keep a history of them")]
pub struct Args {
    /// Path to configuration file; built-in defaults apply when omitted
    #[arg(short, long, env = "PAINTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the listen address
    #[arg(long, env = "PAINTER_LISTEN")]
    pub listen: Option<SocketAddr>,
}
