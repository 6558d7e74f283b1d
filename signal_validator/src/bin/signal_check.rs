use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use market_data_ingestor::providers::{
    ClockProvider,
    alpaca_rest::{AlpacaProvider, verify::verify_access},
};
use shared_utils::env::get_env_var;
use signal_validator::{
    Direction, SignalValidator, ValidatorConfig,
    config::load_config_path,
    tz::parse_moment,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Multi-timeframe signal checks against Alpaca market data")]
struct Cli {
    /// Validator config (TOML). Falls back to $SIGNAL_CHECK_CONFIG, then defaults.
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Check that the API keys reach both the trading clock and market data.
    Verify,
    /// MACD and SMA on every configured timeframe, then the quality score.
    Evaluate {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        direction: Direction,
        /// Reference moment (RFC-3339 or local `YYYY-MM-DD HH:MM`); defaults to the market clock.
        #[arg(long)]
        at: Option<String>,
    },
    /// Quality score of the latest one-minute bars only.
    Score {
        #[arg(long)]
        symbol: String,
        #[arg(long, default_value = "CALL")]
        direction: Direction,
        #[arg(long)]
        at: Option<String>,
    },
}

fn load_config(path: Option<PathBuf>) -> Result<ValidatorConfig> {
    let path = path.or_else(|| get_env_var("SIGNAL_CHECK_CONFIG").ok().map(PathBuf::from));
    match path {
        Some(p) => load_config_path(&p),
        None => Ok(ValidatorConfig::default()),
    }
}

async fn reference_moment(
    provider: &AlpacaProvider,
    at: Option<&str>,
    tz: Tz,
) -> Result<DateTime<Tz>> {
    if let Some(s) = at {
        return parse_moment(s, tz);
    }
    let clock = provider.clock().await.context("read market clock")?;
    let now: DateTime<Utc> = clock.timestamp;
    Ok(now.with_timezone(&tz))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config)?;
    let tz = config.timezone;
    let provider = AlpacaProvider::new().context("create Alpaca provider")?;

    match cli.cmd {
        Cmd::Verify => {
            let clock = verify_access(&provider).await.context("credential check failed")?;
            println!(
                "access ok; market {} at {}",
                if clock.is_open { "open" } else { "closed" },
                clock.timestamp.with_timezone(&tz)
            );
        }
        Cmd::Evaluate {
            symbol,
            direction,
            at,
        } => {
            let moment = reference_moment(&provider, at.as_deref(), tz).await?;
            info!(%symbol, %direction, %moment, "evaluating signal");
            let validator = SignalValidator::new(provider, config);
            let report = validator.evaluate(&symbol, direction, moment).await;
            println!("{report}");
        }
        Cmd::Score {
            symbol,
            direction,
            at,
        } => {
            let moment = reference_moment(&provider, at.as_deref(), tz).await?;
            let validator = SignalValidator::new(provider, config);
            let text = validator
                .evaluate_quality(&symbol, moment.date_naive(), direction, moment)
                .await;
            println!("{text}");
        }
    }

    Ok(())
}
