pub mod calendar;
pub mod dashboard;

use std::env;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use crate::{
    store::{entities::User, rest::RestScoreStore},
    sync::ScoreSync,
    utils::{clock::DefaultClock, dir::create_application_default_path, logging::enable_logging},
};

use calendar::CalendarCommand;

const STORE_URL_VAR: &str = "DAYSCORE_STORE_URL";
const DEFAULT_STORE_URL: &str = "http://localhost:5984";

#[derive(Parser, Debug)]
#[command(name = "Dayscore", version, long_about = None)]
#[command(about = "Track a daily productivity score for you and your friends", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, short, default_value_t = User::Vaishnavi, help = "Identity to act as")]
    user: User,
    #[arg(
        long = "store-url",
        help = "Base url of the score store. Falls back to $DAYSCORE_STORE_URL, then to a store on localhost"
    )]
    store_url: Option<String>,
    #[arg(long, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Show today's score and a word of encouragement")]
    Dashboard,
    #[command(about = "Record today's productivity score", allow_negative_numbers = true)]
    Save {
        #[arg(help = "The score, an integer between 0 and 10")]
        score: i64,
    },
    #[command(about = "Review past scores on a month calendar")]
    Calendar {
        #[command(flatten)]
        command: CalendarCommand,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(&create_application_default_path()?, logging_level, args.log)?;

    let store = RestScoreStore::new(&resolve_store_url(args.store_url))?;
    let sync = ScoreSync::new(store, Box::new(DefaultClock));

    match args.commands {
        Commands::Dashboard => dashboard::show_dashboard(&sync, args.user).await,
        Commands::Save { score } => dashboard::save_score(&sync, args.user, score).await,
        Commands::Calendar { command } => {
            calendar::process_calendar_command(&sync, args.user, command).await
        }
    }
}

/// Explicit flag first, then the environment, then the conventional local store.
fn resolve_store_url(flag: Option<String>) -> String {
    flag.or_else(|| env::var(STORE_URL_VAR).ok())
        .unwrap_or_else(|| DEFAULT_STORE_URL.to_string())
}
