//! Talking to the remote document store.
//! The basic idea is:
//!  - every user owns a partition named after them,
//!  - a partition holds one document per calendar date, keyed by the ISO date string,
//!  - [score_store::ScoreStore] is the seam everything else goes through, so tests can swap the
//!    remote service for an in-memory one.

pub mod entities;
pub mod memory;
pub mod rest;
pub mod score_store;
