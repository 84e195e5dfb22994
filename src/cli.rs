//! Command line interface for the `tcpload` binary.

use std::path::PathBuf;

use clap::Parser;

/// Convert a TCPWatch capture into a FunkLoad script.
///
/// Without `--output` the script body is printed on stdout. With it, a
/// FunkLoad test case `test_<ClassName>.py` and its `<ClassName>.conf`
/// configuration are created; existing files are never overwritten.
#[derive(Debug, Parser)]
#[command(name = "tcpload", version, about)]
pub struct Cli {
    /// Path to an existing TCPWatch capture directory.
    #[arg(short, long, value_name = "DIR")]
    pub input: Option<PathBuf>,

    /// Create a FunkLoad test case and configuration for this test name.
    #[arg(short, long, value_name = "TEST_NAME")]
    pub output: Option<String>,

    /// TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// File name prefix of capture files.
    #[arg(long)]
    pub prefix: Option<String>,

    /// Directory receiving uploaded files found in the capture.
    #[arg(long, value_name = "DIR")]
    pub upload_dir: Option<PathBuf>,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}
