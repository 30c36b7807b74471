use std::error::Error;

use clap::Parser;
use env_logger::Builder;
use log::{debug, info, LevelFilter};

use route_publisher::cli::{query, Args, Command};
use route_publisher::config::Config;
use route_publisher::service::serve;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let (crate_level, other_level) = match args.verbose {
        0 => (LevelFilter::Info, LevelFilter::Warn),
        1 => (LevelFilter::Debug, LevelFilter::Warn),
        2 => (LevelFilter::Trace, LevelFilter::Warn),
        _ => (LevelFilter::Trace, LevelFilter::Trace),
    };
    Builder::new()
        .filter(Some("route_publisher"), crate_level)
        .filter(None, other_level)
        .init();
    info!("Logging at levels {}/{}", crate_level, other_level);

    let config = Config::load(args.config.as_deref(), &args.overrides())?;
    debug!("Loaded config: {:?}", config);

    match &args.cmd {
        None | Some(Command::Run) => serve(config).await?,
        Some(Command::Show(show)) => query(show, &config).await,
    }
    Ok(())
}
