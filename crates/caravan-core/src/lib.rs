//! Serial migration engine for versioned applications.
//!
//! An application upgrading across versions registers its migration
//! steps ("tribes"), each carrying a [`Target`](caravan_target::Target)
//! that decides when it runs. The engine orders them, filters out the
//! ones already covered by the persisted checkpoint, and runs the rest
//! one at a time, advancing the checkpoint after each successful
//! versioned step and halting on the first failure, so every step runs
//! exactly once and in order.
//!
//! # Architecture
//!
//! ```text
//!        application (tribes + listener)
//!                     |
//!                 Caravan  — pack, plan, migrate
//!                /        \
//!        caravan-target   CheckpointStore
//!        (ordering)       (persisted checkpoint)
//! ```
//!
//! See [`Caravan`] for the lifecycle and the caller obligations around
//! concurrency.

pub mod audit;
pub mod engine;
pub mod error;
pub mod listener;
mod plan;
pub mod store;
pub mod tribe;

pub use audit::audit;
pub use engine::Caravan;
pub use error::{Error, Result};
pub use listener::{MigrationListener, NoopListener};
pub use store::{CHECKPOINT_KEY, CheckpointStore, JsonFileStore, MemoryStore, StoreError};
pub use tribe::{Tribe, TribeDescriptor, TribeError};
