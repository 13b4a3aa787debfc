//! Pure colony economy logic for Outpost.
//!
//! This crate contains all simulation math that is independent of any
//! catalog, engine, or runtime. Functions take plain data and return plain
//! data, making them unit-testable and portable between the game engine and
//! headless tools.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`blackhole`] | Unlock-gated singularity: mass growth, dark matter, energy emission |
//! | [`buildings`] | Building instances and the staffing × input-availability efficiency evaluator |
//! | [`flow`] | Resource flow engine: rate aggregation, capacity rederivation, slice settling |
//! | [`offline`] | Segmented, efficiency-penalized offline catch-up replay |
//! | [`population`] | Life-support draw, worker pool bookkeeping, growth and survival |
//! | [`resources`] | Resource pools, amount/capacity invariants, cost tables |

pub mod blackhole;
pub mod buildings;
pub mod flow;
pub mod offline;
pub mod population;
pub mod resources;
