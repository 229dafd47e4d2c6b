//! Slotbot — booking automation engine CLI.
//!
//! Loads the configuration, builds the engine, dispatches exactly one
//! typed intent for the given user identity and prints the typed outcome
//! as JSON. A conversational front-end talks to the same [`Engine`] API
//! this binary exercises.

mod cli;

use anyhow::{Context, bail};
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use slotbot_config::{Config, ConfigLoader, ConfigValidator};
use slotbot_engine::Engine;
use slotbot_protocols::Intent;

use cli::{Cli, Commands, RoomArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if let Commands::Rooms = cli.command {
        println!("{}", serde_json::to_string_pretty(&config.rooms)?);
        return Ok(());
    }

    let intent = build_intent(&cli.command, &config)?;
    let engine = Engine::new(config);

    let outcome = engine.dispatch(&cli.user, intent).await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    engine.shutdown().await;
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let config = if cli.config.exists() {
        ConfigLoader::load(&cli.config)
            .with_context(|| format!("loading {}", cli.config.display()))?
    } else {
        warn!(
            "config file {} not found, using built-in defaults",
            cli.config.display()
        );
        Config::default()
    };

    let validation = ConfigValidator::validate(&config);
    if !validation.is_valid() {
        for error in &validation.errors {
            eprintln!("config error at {}: {}", error.path, error.message);
        }
        bail!("invalid configuration");
    }

    Ok(config)
}

fn build_intent(command: &Commands, config: &Config) -> anyhow::Result<Intent> {
    Ok(match command {
        Commands::Rooms => unreachable!("handled before intent dispatch"),
        Commands::Services { room } => Intent::FetchServices {
            room_url: resolve_room(room, config)?,
        },
        Commands::Slots {
            room,
            services,
            date,
        } => Intent::FetchSlots {
            room_url: resolve_room(room, config)?,
            service_ids: services.clone(),
            date: parse_date(date)?,
        },
        Commands::Book {
            room,
            services,
            date,
            times,
            comment,
        } => Intent::Book {
            room_url: resolve_room(room, config)?,
            service_ids: services.clone(),
            date: parse_date(date)?,
            times: times.clone(),
            comment: comment.clone(),
        },
        Commands::Login { phone, password } => Intent::Login {
            phone: phone.clone(),
            password: password.clone(),
        },
        Commands::Register {
            name,
            phone,
            password,
            confirm,
        } => Intent::Register {
            name: name.clone(),
            phone: phone.clone(),
            password: password.clone(),
            confirm: confirm.clone().unwrap_or_else(|| password.clone()),
        },
        Commands::Records => Intent::FetchRecords,
    })
}

fn resolve_room(room: &RoomArgs, config: &Config) -> anyhow::Result<String> {
    if let Some(url) = &room.url {
        return Ok(url.clone());
    }
    let Some(key) = &room.room else {
        bail!("either --room or --url is required");
    };
    match config.room_by_key(key) {
        Some(room) => Ok(room.url.clone()),
        None => {
            let known: Vec<&str> = config.rooms.iter().map(|r| r.key.as_str()).collect();
            bail!("unknown room '{key}', configured rooms: {known:?}");
        }
    }
}

/// `YYYY-MM-DD`, or `+N` days from today.
fn parse_date(value: &str) -> anyhow::Result<NaiveDate> {
    if let Some(offset) = value.strip_prefix('+') {
        let days: i64 = offset.parse().context("day offset must be a number")?;
        return Ok(Utc::now().date_naive() + ChronoDuration::days(days));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{value}', expected YYYY-MM-DD or +N"))
}
