use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wifikey")]
#[command(version = "0.1.0")]
#[command(about = "Online WiFi credential audit loop - Educational use only", long_about = None)]
pub struct Args {
    /// Verbose output (debug-level logging)
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub mode: Mode,
}

#[derive(Subcommand)]
pub enum Mode {
    /// Run the online attempt loop against a target network
    ///
    /// Iterates candidate passwords from a wordlist, applying each through
    /// the OS profile store and checking whether the connection comes up.
    /// Progress is persisted per (network, wordlist) so an interrupted run
    /// resumes at the wordlist byte it stopped on.
    ///
    /// Example: wifikey blast --ssid HomeNet --wordlist passwords.txt --output C:\audits
    Blast {
        /// Target network SSID
        #[arg(short, long)]
        ssid: String,

        /// Path to the wordlist file (one candidate per line)
        #[arg(short, long, value_name = "WORDLIST")]
        wordlist: PathBuf,

        /// Directory for the WiFiKey output tree (logs, resume index, profile scratch)
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Per-phase timeout in seconds for scan and connect waits
        #[arg(short, long, default_value = "10")]
        timeout: u64,
    },

    /// Generate a codebook of every charset combination at a fixed length
    ///
    /// Writes numbered wordlist files (Serial_Number0.txt, ...) under
    /// <output>/Codebook, each holding at most --per-file lines.
    ///
    /// Example: wifikey generate --output C:\audits --charset 0123456789 --length 8
    Generate {
        /// Directory to place the Codebook folder in
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Characters to combine
        #[arg(short, long, default_value = "0123456789")]
        charset: String,

        /// Length of each generated password
        #[arg(short, long, default_value = "8")]
        length: usize,

        /// Maximum lines per generated file
        #[arg(short, long, default_value = "50000")]
        per_file: u64,
    },
}
