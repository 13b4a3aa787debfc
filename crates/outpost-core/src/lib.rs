//! Colony economy engine for Outpost.
//!
//! The core is a deterministic state-transition machine: every entry point
//! takes a [`state::GameState`] snapshot plus immutable [`catalog::Catalogs`]
//! and returns a new snapshot alongside a list of [`events::Notification`]s.
//! No I/O, no internal parallelism, no shared mutable state — the host owns
//! the canonical snapshot and publishes each returned one atomically before
//! driving the next transition.
//!
//! Entry points:
//!
//! - [`engine::new_game`] — a fresh colony.
//! - [`engine::tick`] — one active-play step over a bounded time delta.
//! - [`engine::resume`] — offline catch-up over a session gap, with a
//!   welcome-back report.
//! - [`commands::dispatch`] — player commands (construction, research,
//!   expeditions, black hole control).
//! - [`persistence`] — versioned binary/JSON save round-trips.

pub mod catalog;
pub mod commands;
pub mod engine;
pub mod events;
pub mod expeditions;
pub mod milestones;
pub mod persistence;
pub mod state;

pub use catalog::Catalogs;
pub use commands::{dispatch, Command};
pub use engine::{new_game, resume, tick, OfflineReport, ResumeOutcome, TickOutcome};
pub use events::Notification;
pub use state::GameState;
