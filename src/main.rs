mod api;
mod app;
mod config;
mod event;
mod logging;
mod store;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bugtrack")]
#[command(about = "A terminal UI for a REST bug tracker")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/bugtrack/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Base URL of the bug tracker API (overrides api.url)
  #[arg(short, long)]
  url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let mut config = config::Config::load(args.config.as_deref())?;
  if let Some(url) = args.url {
    config.api.url = url;
  }

  let _log_guard = logging::init(&config.log)?;
  tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting bugtrack");

  let mut app = app::App::new(&config)?;
  app.run().await?;

  Ok(())
}
