//! Command-line front end for `dayplan_core`.
//!
//! # Responsibility
//! - Map subcommands onto `Scheduler` commands.
//! - Keep output plain text for terminal use.

mod commands;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dayplan_core::{
    default_log_level, init_logging_for, Category, CoreConfig, Priority, ReminderOffset,
};

#[derive(Parser)]
#[command(name = "dayplan")]
#[command(about = "Plan your day across isolated profiles, with reminders")]
struct Cli {
    /// Data directory (defaults to $DAYPLAN_DATA_DIR or the platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// Log level: trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the core version
    Version,
    /// List events for one day (default: today)
    List {
        /// Day to show (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// List the seven days starting at a date (default: today)
    Week {
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
    },
    /// Case-insensitive title search; empty text lists everything
    Search {
        #[arg(default_value = "")]
        text: String,
    },
    /// Add an event to the active profile
    Add {
        title: String,

        /// Day (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Start time (HH:MM)
        #[arg(long)]
        start: String,

        /// End time (HH:MM)
        #[arg(long)]
        end: String,

        #[arg(long, default_value = "OTHER")]
        category: Category,

        #[arg(long, default_value = "MEDIUM")]
        priority: Priority,

        /// none, 15m, 1h or 1d
        #[arg(long, default_value = "none")]
        reminder: ReminderOffset,

        #[arg(long, default_value = "")]
        location: String,

        #[arg(long, default_value = "")]
        description: String,
    },
    /// Delete an event by id
    Delete { id: String },
    /// List profiles; the active one is marked with `*`
    Profiles,
    /// Manage profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Stay running and print reminders as they fire
    Watch,
}

#[derive(Subcommand)]
enum ProfileAction {
    Create { name: String },
    /// Switch by id or name
    Switch { profile: String },
    Rename { profile: String, name: String },
    Delete { profile: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("dayplan {}", dayplan_core::core_version());
        return Ok(());
    }

    let env_data_dir = std::env::var(dayplan_core::config::DATA_DIR_ENV).ok();
    let env_reminder_secs = std::env::var(dayplan_core::config::REMINDER_SECS_ENV).ok();
    let config = CoreConfig::from_values(
        cli.data_dir.as_deref().or(env_data_dir.as_deref()),
        env_reminder_secs.as_deref(),
    )?;

    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    if let Err(err) = init_logging_for(&config, level) {
        eprintln!("warning: file logging disabled: {err}");
    }

    match cli.command {
        Commands::Version => Ok(()),
        Commands::List { date } => commands::list(config, date.as_deref()),
        Commands::Week { from } => commands::week(config, from.as_deref()),
        Commands::Search { text } => commands::search(config, &text),
        Commands::Add {
            title,
            date,
            start,
            end,
            category,
            priority,
            reminder,
            location,
            description,
        } => commands::add(
            config,
            commands::AddArgs {
                title,
                date,
                start,
                end,
                category,
                priority,
                reminder,
                location,
                description,
            },
        ),
        Commands::Delete { id } => commands::delete(config, &id),
        Commands::Profiles => commands::profiles(config),
        Commands::Profile { action } => match action {
            ProfileAction::Create { name } => commands::profile_create(config, &name),
            ProfileAction::Switch { profile } => commands::profile_switch(config, &profile),
            ProfileAction::Rename { profile, name } => {
                commands::profile_rename(config, &profile, &name)
            }
            ProfileAction::Delete { profile } => commands::profile_delete(config, &profile),
        },
        Commands::Watch => commands::watch(config),
    }
}
