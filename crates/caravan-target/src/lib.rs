//! Migration targets for the caravan workspace.
//!
//! This crate is the layer-0 building block: the [`Target`] ordering
//! token, its fallible comparison contract, and the parsed
//! [`ResolvedTarget`] form that carries a total order. It is pure (no
//! I/O, no async), so the planner and engine above it stay testable
//! without fixtures.

pub mod error;
pub mod target;

pub use error::{Error, Result};
pub use target::{ResolvedTarget, Target};
