//! Palaver REPL entry point.

// A line REPL writes to the terminal directly; that is its job.
#![allow(clippy::print_stdout, clippy::print_stderr)]

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod render;
mod runtime;
mod shell;

/// Palaver terminal chat client
#[derive(Parser, Debug)]
#[command(name = "palaver")]
#[command(about = "Terminal REPL client for the Palaver chat protocol")]
#[command(version)]
struct Args {
    /// Default server host for `connect`
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Default server port for `connect`
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    ///
    /// Logs go to stderr; the default keeps the REPL quiet.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(std::io::stderr)).with(filter).init();

    let defaults = shell::ShellConfig { host: args.host, port: args.port };
    shell::run(defaults).await;

    Ok(())
}
