//! clinic-roster command-line entry point.
//!
//! Loads configuration and the optional roster seed, then prints the
//! resolved week containing the given date (default: today) as JSON.
//!
//! ```text
//! clinic-roster [YYYY-MM-DD] [OPTOMETRIST_ID]
//! ```

use anyhow::Context;
use chrono::{Local, NaiveDate};

use clinic_roster::app_state::AppState;
use clinic_roster::config::SchedulerConfig;
use clinic_roster::domain::OptometristId;
use clinic_roster::error::ErrorKind;
use clinic_roster::seed::RosterSeed;
use clinic_roster::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = SchedulerConfig::from_env().context("loading configuration")?;
    telemetry::init(config.log_format);
    tracing::info!(
        slot_minutes = config.slot_policy.slot_minutes(),
        "starting clinic-roster"
    );

    let state = AppState::new(&config);
    if let Some(path) = &config.seed_path {
        let seed = RosterSeed::load(path)
            .await
            .with_context(|| format!("reading seed {}", path.display()))?;
        seed.apply(&state).await.context("applying seed")?;
    }

    let mut args = std::env::args().skip(1);
    let date = match args.next() {
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .with_context(|| format!("invalid date '{raw}', expected YYYY-MM-DD"))?,
        None => Local::now().date_naive(),
    };
    let optometrist_id = match args.next() {
        Some(raw) => OptometristId::new(
            raw.parse::<u64>()
                .with_context(|| format!("invalid optometrist id '{raw}'"))?,
        ),
        None => match state.resolver.default_optometrist().await {
            Ok(optometrist) => optometrist.id,
            Err(err) => {
                tracing::warn!(%err, "no schedule available");
                println!("{}", serde_json::to_string_pretty(&err.to_body())?);
                return Ok(());
            }
        },
    };

    match state.resolver.resolve_week(date, optometrist_id).await {
        Ok(week) => println!("{}", serde_json::to_string_pretty(&week)?),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::warn!(%err, "no schedule available");
            println!("{}", serde_json::to_string_pretty(&err.to_body())?);
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
