//! riakctl: command-line client for a Riak node.
//!
//! Usage:
//!   riakctl --host 10.0.0.5 put people '{"name": "John", "age": 28}' --auto-index age:int
//!   riakctl range people age 20 30
//!
//! Connection settings come from `--config <file.json>` (fields of
//! `RiakConfig`), then `--host`/`--port`. `RUST_LOG` overrides the log level.

use anyhow::Result;
use clap::Parser;
use riak_cli::{Args, load_config, run};
use riak_connector::Connector;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = load_config(args.config.as_deref(), args.host, args.port).await?;
    let connector = Connector::with_config(config)?;

    let output = run(&connector, args.command).await?;
    println!("{output}");
    Ok(())
}
