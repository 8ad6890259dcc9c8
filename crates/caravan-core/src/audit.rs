//! Static validation of declared tribes.

use crate::tribe::TribeDescriptor;

/// Returns the tribes whose targets fail validation, in input order.
///
/// Total: individual validation failures are collected, never propagated.
/// Run this in your test suite over the tribe set you ship; a set that
/// audits clean can never hit the fatal registration path of
/// [`Caravan::pack`](crate::engine::Caravan::pack).
pub fn audit(tribes: &[TribeDescriptor]) -> Vec<&TribeDescriptor> {
    tribes
        .iter()
        .filter(|tribe| tribe.target().validate().is_err())
        .collect()
}
