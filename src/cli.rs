//! CLI definitions for slotbot.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Slotbot CLI: dispatch one engine intent and print the JSON outcome.
#[derive(Parser)]
#[command(name = "slotbot")]
#[command(about = "Booking automation engine for appointment sites")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    /// End-user identity owning the browser session and profile
    #[arg(short, long, default_value = "cli", global = true)]
    pub user: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List configured rooms
    Rooms,

    /// Fetch the service catalog for a room
    Services {
        #[command(flatten)]
        room: RoomArgs,
    },

    /// Fetch free time slots for a room, service set and date
    Slots {
        #[command(flatten)]
        room: RoomArgs,

        /// Service id (repeatable)
        #[arg(short, long = "service", required = true)]
        services: Vec<String>,

        /// Date: YYYY-MM-DD, or +N days from today
        #[arg(short, long, default_value = "+0")]
        date: String,
    },

    /// Book one or more slots
    Book {
        #[command(flatten)]
        room: RoomArgs,

        /// Service id (repeatable)
        #[arg(short, long = "service", required = true)]
        services: Vec<String>,

        /// Date: YYYY-MM-DD, or +N days from today
        #[arg(short, long, default_value = "+0")]
        date: String,

        /// Slot time "HH:MM" (repeatable)
        #[arg(short, long = "time", required = true)]
        times: Vec<String>,

        /// Comment attached to the booking
        #[arg(long, default_value = "")]
        comment: String,
    },

    /// Log in on the site
    Login {
        #[arg(long)]
        phone: String,

        #[arg(long)]
        password: String,
    },

    /// Register a new account
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        phone: String,

        #[arg(long)]
        password: String,

        /// Password confirmation; defaults to the password itself
        #[arg(long)]
        confirm: Option<String>,
    },

    /// Fetch the user's existing reservations
    Records,
}

/// Target room: a configured key or an explicit URL.
#[derive(clap::Args)]
pub(crate) struct RoomArgs {
    /// Room key from the configuration
    #[arg(short, long)]
    pub room: Option<String>,

    /// Explicit room URL (overrides --room)
    #[arg(long)]
    pub url: Option<String>,
}
