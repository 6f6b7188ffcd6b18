use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// The closed roster of identities sharing the tracker. Every user owns a disjoint partition on
/// the remote store, named after the user; switching users switches the partition.
#[derive(PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Clone, Copy)]
pub enum User {
    Vaishnavi,
    Aleena,
    Atharva,
}

impl User {
    pub const ALL: [User; 3] = [User::Vaishnavi, User::Aleena, User::Atharva];

    /// Name of the user's partition on the remote store.
    pub fn as_str(&self) -> &'static str {
        match self {
            User::Vaishnavi => "Vaishnavi",
            User::Aleena => "Aleena",
            User::Atharva => "Atharva",
        }
    }
}

impl Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for User {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        User::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                anyhow!("Unknown user {s}. Expected one of Vaishnavi, Aleena, Atharva")
            })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("score must be an integer between 0 and 10, got {0}")]
pub struct InvalidScore(pub i64);

/// Daily productivity rating, 0 (lowest) to 10 (highest). [Score::new] is the single validation
/// point; the range is checked again when a document comes back from the store.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Clone, Copy)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
    pub fn new(value: i64) -> Result<Score, InvalidScore> {
        if (0..=10).contains(&value) {
            Ok(Score(value as u8))
        } else {
            Err(InvalidScore(value))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = i64::deserialize(deserializer)?;
        Score::new(value).map_err(serde::de::Error::custom)
    }
}

/// The document stored per user per day. The date doubles as the document key within the user's
/// partition, so there is at most one record per day and a save overwrites.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, Copy)]
pub struct ScoreRecord {
    pub date: NaiveDate,
    pub score: Score,
}

/// Date to score mapping for one partition. Rebuilt in full on every user switch and after every
/// save, never merged across users.
pub type ScoreIndex = HashMap<NaiveDate, Score>;

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;

    use super::{Score, ScoreRecord, User};

    #[test]
    fn test_score_bounds() {
        assert!(Score::new(0).is_ok());
        assert!(Score::new(10).is_ok());
        assert!(Score::new(-1).is_err());
        assert!(Score::new(11).is_err());
    }

    #[test]
    fn test_record_wire_format() -> Result<()> {
        let record = ScoreRecord {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            score: Score::new(9)?,
        };

        let json = serde_json::to_string(&record)?;
        assert_eq!(json, r#"{"date":"2024-05-01","score":9}"#);

        let parsed = serde_json::from_str::<ScoreRecord>(&json)?;
        assert_eq!(parsed, record);
        Ok(())
    }

    #[test]
    fn test_out_of_range_document_is_rejected() {
        let result = serde_json::from_str::<ScoreRecord>(r#"{"date":"2024-05-01","score":12}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_user_parsing() {
        assert_eq!("Aleena".parse::<User>().unwrap(), User::Aleena);
        assert_eq!("vaishnavi".parse::<User>().unwrap(), User::Vaishnavi);
        assert!("Nobody".parse::<User>().is_err());
    }
}
