//! The synchronization layer between view state and the remote store. Views keep a
//! [SessionState] and never talk to the store directly; every read and write of score documents
//! goes through [ScoreSync].
//!
//! The flow mirrors what a thin front end needs:
//!  - activating a view or switching identity triggers a full [ScoreSync::refresh],
//!  - a save writes today's document and then reloads everything the write may have changed,
//!  - a refresh carries the generation of the identity it was started for, and
//!    [ScoreSync::apply_refresh] drops any refresh whose identity has since changed.

use chrono::NaiveDate;
use futures::try_join;
use thiserror::Error;
use tracing::debug;

use crate::{
    store::{
        entities::{InvalidScore, Score, ScoreIndex, ScoreRecord, User},
        score_store::{ScoreStore, StoreError},
    },
    utils::clock::Clock,
};

#[derive(Debug, Error)]
pub enum SyncError {
    /// Rejected before any remote call was made.
    #[error(transparent)]
    InvalidScore(#[from] InvalidScore),
    /// The store misbehaved. Non-fatal for the caller, previously shown state stays valid.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// View state for one identity. Replaced wholesale on identity switch; the generation ties
/// in-flight refreshes to the identity they were started for.
#[derive(Debug)]
pub struct SessionState {
    user: User,
    generation: u64,
    today_score: Option<Score>,
    index: ScoreIndex,
}

impl SessionState {
    pub fn new(user: User) -> Self {
        Self {
            user,
            generation: 0,
            today_score: None,
            index: ScoreIndex::new(),
        }
    }

    pub fn user(&self) -> User {
        self.user
    }

    pub fn today_score(&self) -> Option<Score> {
        self.today_score
    }

    pub fn index(&self) -> &ScoreIndex {
        &self.index
    }

    pub fn score_on(&self, date: NaiveDate) -> Option<Score> {
        self.index.get(&date).copied()
    }
}

/// The outcome of one round of fetches, tagged with the identity and generation it was fetched
/// for. Has to go through [ScoreSync::apply_refresh] to become visible.
#[derive(Debug)]
pub struct Refresh {
    user: User,
    generation: u64,
    today_score: Option<Score>,
    index: ScoreIndex,
}

pub struct ScoreSync<S> {
    store: S,
    clock: Box<dyn Clock>,
}

impl<S: ScoreStore> ScoreSync<S> {
    pub fn new(store: S, clock: Box<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Today's date key, from the local zone.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Validates and saves `raw_score` as today's score for the state's identity, then reloads
    /// today's score and the index. An out-of-range score is rejected before the store is
    /// touched. When the write went through but the reload didn't, the saved score stays in the
    /// state and the store error is handed to the caller.
    pub async fn save_today_score(
        &self,
        state: &mut SessionState,
        raw_score: i64,
    ) -> Result<(), SyncError> {
        let score = Score::new(raw_score)?;
        let record = ScoreRecord {
            date: self.clock.today(),
            score,
        };

        self.store.put_score(state.user, record).await?;
        state.today_score = Some(score);

        let refresh = self.refresh(state).await?;
        self.apply_refresh(state, refresh);
        Ok(())
    }

    /// Today's score for `user`. `None` means nothing was recorded yet, which is a normal
    /// outcome, not an error.
    pub async fn fetch_today_score(&self, user: User) -> Result<Option<Score>, SyncError> {
        let record = self.store.get_score(user, self.clock.today()).await?;
        Ok(record.map(|v| v.score))
    }

    /// Every recorded score in `user`'s partition, keyed by date.
    pub async fn fetch_all_scores(&self, user: User) -> Result<ScoreIndex, SyncError> {
        let records = self.store.list_scores(user).await?;
        Ok(records.into_iter().map(|v| (v.date, v.score)).collect())
    }

    /// Fetches today's score and the full index for the state's identity. The state itself is
    /// not touched, the result goes through [Self::apply_refresh].
    pub async fn refresh(&self, state: &SessionState) -> Result<Refresh, SyncError> {
        let user = state.user;
        let (today_score, index) = try_join!(
            self.fetch_today_score(user),
            self.fetch_all_scores(user)
        )?;
        Ok(Refresh {
            user,
            generation: state.generation,
            today_score,
            index,
        })
    }

    /// Installs a refresh into the state, unless the identity changed while the refresh was in
    /// flight. A stale refresh is dropped, the previous user's data must never show up under
    /// the current one. Returns whether the refresh was applied.
    pub fn apply_refresh(&self, state: &mut SessionState, refresh: Refresh) -> bool {
        if refresh.generation != state.generation {
            debug!(
                "Dropping stale refresh for {} (generation {} behind {})",
                refresh.user, refresh.generation, state.generation
            );
            return false;
        }
        state.today_score = refresh.today_score;
        state.index = refresh.index;
        true
    }

    /// Makes `user` the active identity. The state starts out unset, replace not merge; the
    /// caller follows up with a refresh.
    pub fn switch_user(&self, state: &mut SessionState, user: User) {
        state.user = user;
        state.generation += 1;
        state.today_score = None;
        state.index = ScoreIndex::new();
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{anyhow, Result};
    use chrono::{DateTime, Local, NaiveDate};

    use crate::{
        quotes::{quote_for, QuotePicker},
        store::{
            entities::{Score, ScoreRecord, User},
            memory::MemoryScoreStore,
            score_store::{MockScoreStore, ScoreStore, StoreError},
        },
        utils::{clock::Clock, logging::TEST_LOGGING},
    };

    use super::{ScoreSync, SessionState, SyncError};

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

    struct FixedClock(NaiveDate);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Local> {
            Local::now()
        }

        fn today(&self) -> NaiveDate {
            self.0
        }
    }

    fn test_sync(store: MemoryScoreStore) -> ScoreSync<MemoryScoreStore> {
        ScoreSync::new(store, Box::new(FixedClock(TEST_DATE)))
    }

    #[tokio::test]
    async fn test_save_then_fetch_round_trips_every_valid_score() -> Result<()> {
        *TEST_LOGGING;
        let sync = test_sync(MemoryScoreStore::new());
        let mut state = SessionState::new(User::Vaishnavi);

        for value in 0..=10 {
            sync.save_today_score(&mut state, value).await?;
            assert_eq!(
                sync.fetch_today_score(User::Vaishnavi).await?,
                Some(Score::new(value)?)
            );
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_save_reloads_the_index() -> Result<()> {
        let sync = test_sync(MemoryScoreStore::new());
        let mut state = SessionState::new(User::Vaishnavi);

        sync.save_today_score(&mut state, 9).await?;

        assert_eq!(state.today_score(), Some(Score::new(9)?));
        assert_eq!(state.score_on(TEST_DATE), Some(Score::new(9)?));
        assert_eq!(state.index().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_score_for_the_day() -> Result<()> {
        let sync = test_sync(MemoryScoreStore::new());
        let mut state = SessionState::new(User::Atharva);

        sync.save_today_score(&mut state, 3).await?;
        sync.save_today_score(&mut state, 8).await?;

        assert_eq!(sync.fetch_today_score(User::Atharva).await?, Some(Score::new(8)?));
        assert_eq!(state.index().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_without_record_is_unset() -> Result<()> {
        let sync = test_sync(MemoryScoreStore::new());

        assert_eq!(sync.fetch_today_score(User::Aleena).await?, None);
        assert!(sync.fetch_all_scores(User::Aleena).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_saved_score_gets_a_matching_quote() -> Result<()> {
        struct FirstPick;
        impl QuotePicker for FirstPick {
            fn pick(&self, _pool_len: usize) -> usize {
                0
            }
        }

        let sync = test_sync(MemoryScoreStore::new());
        let mut state = SessionState::new(User::Vaishnavi);

        sync.save_today_score(&mut state, 9).await?;

        let score = sync
            .fetch_today_score(User::Vaishnavi)
            .await?
            .expect("score was just saved");
        assert_eq!(score, Score::new(9)?);
        assert!([
            "Amazing consistency! You're crushing it!",
            "Outstanding effort!"
        ]
        .contains(&quote_for(score, &FirstPick)));
        Ok(())
    }

    #[tokio::test]
    async fn test_switching_users_replaces_state() -> Result<()> {
        let store = MemoryScoreStore::new();
        store
            .put_score(
                User::Vaishnavi,
                ScoreRecord {
                    date: TEST_DATE,
                    score: Score::new(9)?,
                },
            )
            .await?;
        let sync = test_sync(store);

        let mut state = SessionState::new(User::Vaishnavi);
        let refresh = sync.refresh(&state).await?;
        assert!(sync.apply_refresh(&mut state, refresh));
        assert_eq!(state.today_score(), Some(Score::new(9)?));

        // Aleena has no records, none of Vaishnavi's may leak through.
        sync.switch_user(&mut state, User::Aleena);
        assert_eq!(state.today_score(), None);
        assert!(state.index().is_empty());

        let refresh = sync.refresh(&state).await?;
        assert!(sync.apply_refresh(&mut state, refresh));
        assert_eq!(state.today_score(), None);
        assert!(state.index().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_late_refresh_for_previous_user_is_dropped() -> Result<()> {
        let store = MemoryScoreStore::new();
        store
            .put_score(
                User::Vaishnavi,
                ScoreRecord {
                    date: TEST_DATE,
                    score: Score::new(7)?,
                },
            )
            .await?;
        let sync = test_sync(store);
        let mut state = SessionState::new(User::Vaishnavi);

        // The fetch for Vaishnavi resolves only after the switch to Aleena.
        let stale = sync.refresh(&state).await?;
        sync.switch_user(&mut state, User::Aleena);

        assert!(!sync.apply_refresh(&mut state, stale));
        assert_eq!(state.user(), User::Aleena);
        assert_eq!(state.today_score(), None);
        assert!(state.index().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_out_of_range_score_never_reaches_the_store() {
        // No expectations set up, any store call would panic the test.
        let sync = ScoreSync::new(MockScoreStore::new(), Box::new(FixedClock(TEST_DATE)));
        let mut state = SessionState::new(User::Vaishnavi);

        for raw in [-1, 11, 100] {
            let result = sync.save_today_score(&mut state, raw).await;
            assert!(matches!(result, Err(SyncError::InvalidScore(_))));
        }
        assert_eq!(state.today_score(), None);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_prior_state() {
        let mut store = MockScoreStore::new();
        store
            .expect_put_score()
            .returning(|_, _| Err(StoreError::Unavailable(anyhow!("store is down"))));
        let sync = ScoreSync::new(store, Box::new(FixedClock(TEST_DATE)));
        let mut state = SessionState::new(User::Vaishnavi);

        let result = sync.save_today_score(&mut state, 5).await;

        assert!(matches!(result, Err(SyncError::Store(_))));
        assert_eq!(state.today_score(), None);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_the_saved_score() {
        let mut store = MockScoreStore::new();
        store.expect_put_score().returning(|_, _| Ok(()));
        store
            .expect_get_score()
            .returning(|_, _| Err(StoreError::Unavailable(anyhow!("store went away"))));
        store
            .expect_list_scores()
            .returning(|_| Err(StoreError::Unavailable(anyhow!("store went away"))));
        let sync = ScoreSync::new(store, Box::new(FixedClock(TEST_DATE)));
        let mut state = SessionState::new(User::Vaishnavi);

        let result = sync.save_today_score(&mut state, 7).await;

        // The remote accepted the write, so the local score stands even though the reload
        // failed.
        assert!(matches!(result, Err(SyncError::Store(_))));
        assert_eq!(state.today_score(), Some(Score::new(7).unwrap()));
    }
}
