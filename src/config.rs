use clap::Parser;
use std::path::PathBuf;

/// Serve points ledger requests, one JSON object per line
///
/// Each input line is `{"route": "add" | "balance" | "deduct", "body": {...}}` and produces one
/// `{"status": ..., "body": ...}` line on stdout. Log verbosity is set with `RUST_LOG`.
#[derive(Debug, Parser)]
#[command(version)]
pub struct Args {
    /// Read requests from this file instead of stdin
    #[arg(long)]
    pub input: Option<PathBuf>,
}
