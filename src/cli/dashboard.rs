use ansi_term::Colour;
use anyhow::Result;
use tracing::warn;

use crate::{
    quotes::{quote_for, EntropyPicker},
    store::{
        entities::{Score, User},
        score_store::ScoreStore,
    },
    sync::{ScoreSync, SessionState, SyncError},
};

/// Command to process `dashboard`. Fetches today's score and the index for `user` and renders
/// the greeting view.
pub async fn show_dashboard<S: ScoreStore>(sync: &ScoreSync<S>, user: User) -> Result<()> {
    let mut state = SessionState::new(user);

    match sync.refresh(&state).await {
        Ok(refresh) => {
            sync.apply_refresh(&mut state, refresh);
        }
        Err(e) => {
            warn!("Dashboard refresh failed {e:?}");
            notice(&format!("Couldn't reach the score store ({e})."));
        }
    }

    render_dashboard(&state);
    Ok(())
}

/// Command to process `save`. Runs the validated write-then-reload path and renders the
/// refreshed dashboard. An out-of-range score is a hard error; store trouble is a notice and
/// the view renders from whatever state is left.
pub async fn save_score<S: ScoreStore>(sync: &ScoreSync<S>, user: User, score: i64) -> Result<()> {
    let mut state = SessionState::new(user);

    match sync.save_today_score(&mut state, score).await {
        Ok(()) => {}
        Err(SyncError::InvalidScore(e)) => return Err(e.into()),
        Err(SyncError::Store(e)) => {
            warn!("Saving today's score failed {e:?}");
            notice(&format!("Score store trouble: {e}."));
        }
    }

    render_dashboard(&state);
    Ok(())
}

fn render_dashboard(state: &SessionState) {
    println!("Hi {}!", state.user());
    match state.today_score() {
        Some(score) => {
            println!("Your score for today: {}", paint_score(score));
            println!("\u{201c}{}\u{201d}", quote_for(score, &EntropyPicker));
        }
        None => println!("No score for today yet. Record one with `dayscore save <0-10>`."),
    }
}

fn notice(message: &str) {
    println!("{}", Colour::Yellow.paint(message));
}

pub(super) fn paint_score(score: Score) -> String {
    let colour = match score.value() {
        0..=3 => Colour::Red,
        4..=7 => Colour::Yellow,
        _ => Colour::Green,
    };
    colour.bold().paint(score.to_string()).to_string()
}
