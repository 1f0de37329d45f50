use std::fs::OpenOptions;
use std::sync::Mutex;

use clap::Parser;
use cinefind_rs::config::{Config, LogFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

#[derive(Parser, Debug)]
#[command(name = "cinefind-server")]
#[command(about = "Free-text movie discovery over the TMDb catalog", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "cinefind-server.yaml")]
    config: String,

    #[arg(short, long)]
    debug: bool,
}

fn init_logging(config: &Config) -> Result<(), std::io::Error> {
    let default_filter = if config.debug_logs {
        "cinefind_rs=debug,tower_http=debug"
    } else {
        "cinefind_rs=info,tower_http=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let fmt_layer = if config.log_to_stdout() {
        let layer = tracing_subscriber::fmt::layer();
        match config.logformat {
            LogFormat::Json => layer.json().boxed(),
            LogFormat::Text => layer.boxed(),
        }
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.logfile)?;
        let layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file));
        match config.logformat {
            LogFormat::Json => layer.json().boxed(),
            LogFormat::Text => layer.boxed(),
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Without a config file everything comes from defaults and the environment.
    let config_file_exists = std::path::Path::new(&args.config).exists();
    let mut config = if config_file_exists {
        match Config::from_file(&args.config) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };
    config.apply_env();
    config.debug_logs = args.debug;

    if let Err(e) = init_logging(&config) {
        eprintln!("Error: cannot open log file {}: {}", config.logfile, e);
        std::process::exit(1);
    }
    if config_file_exists {
        tracing::info!("Using config file: {}", args.config);
    } else {
        tracing::info!("No config file at {}, using defaults", args.config);
    }

    if let Err(e) = cinefind_rs::run(config).await {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
