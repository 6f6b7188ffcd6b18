use std::fmt::Display;

use ansi_term::{Colour, Style};
use anyhow::Result;
use chrono::{DateTime, Datelike, Local, NaiveDate, Weekday};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};
use now::DateTimeNow;
use tracing::warn;

use crate::{
    store::{
        entities::{ScoreIndex, User},
        score_store::ScoreStore,
    },
    sync::ScoreSync,
};

use super::{dashboard::paint_score, Args};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct CalendarCommand {
    #[arg(
        long,
        short,
        help = "Day to inspect. Examples are \"yesterday\", \"15/03/2025\". The calendar shows that day's month, today's by default"
    )]
    date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

/// Command to process `calendar`. Renders a month of recorded scores and, when a day was
/// asked for, that day's score.
pub async fn process_calendar_command<S: ScoreStore>(
    sync: &ScoreSync<S>,
    user: User,
    CalendarCommand { date, date_style }: CalendarCommand,
) -> Result<()> {
    let selected = parse_selected_date(date, date_style)?;

    let index = match sync.fetch_all_scores(user).await {
        Ok(index) => index,
        Err(e) => {
            warn!("Calendar fetch failed {e:?}");
            println!(
                "{}",
                Colour::Yellow.paint("Couldn't reach the score store, showing an empty calendar.")
            );
            ScoreIndex::new()
        }
    };

    let anchor = selected.unwrap_or_else(Local::now);
    let month_start = anchor.beginning_of_month().date_naive();
    let month_end = anchor.end_of_month().date_naive();

    print!(
        "{}",
        render_month(month_start, month_end, &index, sync.today())
    );

    if let Some(selected) = selected {
        let date = selected.date_naive();
        println!();
        println!("{}", date.format("%a %d %B %Y"));
        match index.get(&date) {
            Some(score) => println!("Score: {}", paint_score(*score)),
            None => println!("Score: Not set"),
        }
    }
    Ok(())
}

fn parse_selected_date(
    date: Option<String>,
    date_style: DateStyle,
) -> Result<Option<DateTime<Local>>> {
    let Some(date) = date else {
        return Ok(None);
    };
    match parse_date_string(&date, Local::now(), date_style.into()) {
        Ok(v) => Ok(Some(v)),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to parse date {e}"),
            )
            .into()),
    }
}

/// One month as a fixed-width grid, weeks starting on Monday. Days carrying a score are
/// painted, today is shown inverted.
fn render_month(
    month_start: NaiveDate,
    month_end: NaiveDate,
    index: &ScoreIndex,
    today: NaiveDate,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:^20}\n",
        month_start.format("%B %Y").to_string()
    ));
    out.push_str("Mo Tu We Th Fr Sa Su\n");

    let mut line = "   ".repeat(month_start.weekday().num_days_from_monday() as usize);
    let mut day = month_start;
    loop {
        let mut style = if index.contains_key(&day) {
            Colour::Green.bold()
        } else {
            Style::new()
        };
        if day == today {
            style = style.reverse();
        }
        line.push_str(&style.paint(format!("{:>2}", day.day())).to_string());

        if day == month_end {
            out.push_str(&line);
            out.push('\n');
            break;
        }
        if day.weekday() == Weekday::Sun {
            out.push_str(&line);
            out.push('\n');
            line = String::new();
        } else {
            line.push(' ');
        }
        day = day.succ_opt().expect("End of time should never happen");
    }
    out
}

#[cfg(test)]
mod tests {
    use ansi_term::{Colour, Style};
    use chrono::NaiveDate;

    use crate::store::entities::{Score, ScoreIndex};

    use super::render_month;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[test]
    fn test_month_grid_marks_scored_days() {
        let mut index = ScoreIndex::new();
        index.insert(date(5), Score::new(9).unwrap());

        let out = render_month(date(1), date(31), &index, date(15));

        assert!(out.contains(&Colour::Green.bold().paint(" 5").to_string()));
        // The day after holds no score and stays unpainted.
        assert!(out.contains("\n 6 "));
    }

    #[test]
    fn test_month_grid_inverts_today() {
        let out = render_month(date(1), date(31), &ScoreIndex::new(), date(15));

        assert!(out.contains(&Style::new().reverse().paint("15").to_string()));
    }

    #[test]
    fn test_month_grid_shape() {
        let out = render_month(date(1), date(31), &ScoreIndex::new(), date(15));

        // May 2024 starts on a Wednesday and spans 5 week rows.
        assert_eq!(out.lines().count(), 7);
        assert!(out.lines().nth(2).unwrap().starts_with("       1"));
        assert!(out.starts_with(&format!("{:^20}\n", "May 2024")));
    }
}
