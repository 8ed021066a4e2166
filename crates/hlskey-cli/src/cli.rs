use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// CLI surface definition.
#[derive(Parser, Debug)]
#[command(
    name = "hlskey",
    about = "Generate AES-128 keys and keyinfo files for ffmpeg HLS encryption",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a key file and a keyinfo file for `-hls_key_info_file`.
    Generate(GenerateArgs),
    /// Remove a keyinfo file and the generated key file it points at.
    Clean {
        /// Keyinfo file printed by `hlskey generate`.
        keyinfo: PathBuf,
    },
    /// Print version and exit.
    Version,
    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args, Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerateArgs {
    /// URL players fetch the key from; defaults to `url` in the config file.
    pub url: Option<String>,
    /// Fixed IV as 32 hex digits.
    #[arg(long, conflicts_with = "rand_iv")]
    pub iv: Option<String>,
    /// Generate a random IV.
    #[arg(long)]
    pub rand_iv: bool,
    /// Reference an existing 16-byte key file instead of the generated one.
    #[arg(long)]
    pub key_file: Option<PathBuf>,
    /// Write the keyinfo here instead of the temp directory.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Create a default config file if one does not exist.
    Init,
}
