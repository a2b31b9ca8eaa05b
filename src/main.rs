use clap::Parser;
use log::info;
use points_ledger::{
    adapters::{database::memory::MemoryLedger, json::JsonAdapter},
    commands::DomainLogic,
    config::Args,
};
use std::{
    error::Error,
    fs::File,
    io::{self, BufRead, BufReader},
    sync::Arc,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Logs go to stderr, stdout only carries responses
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let input: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };
    let source = args
        .input
        .as_ref()
        .map_or("stdin".into(), |path| path.display().to_string());
    info!("serving requests from {source}");

    let adapter = JsonAdapter::new(DomainLogic::new(Arc::new(MemoryLedger::default())));
    let served = adapter.serve(input, io::stdout().lock()).await?;

    info!("served {served} request(s)");
    Ok(())
}
