//! Ordering and filtering of packed tribes.

use caravan_target::{ResolvedTarget, Target};

use crate::error::Result;
use crate::tribe::TribeDescriptor;

/// Sort descriptors into migration order at registration time.
///
/// Stable: tribes with equal targets keep their declaration order.
///
/// # Panics
///
/// Panics if any target fails to resolve. A non-SemVer literal is a
/// precondition violation of the registration surface, not a runtime
/// condition; [`audit`](crate::audit::audit) is the sanctioned way to
/// catch it before it can crash.
pub(crate) fn sort_by_target(tribes: Vec<TribeDescriptor>) -> Vec<TribeDescriptor> {
    let mut keyed: Vec<(ResolvedTarget, TribeDescriptor)> = tribes
        .into_iter()
        .map(|tribe| match tribe.target().resolve() {
            Ok(resolved) => (resolved, tribe),
            Err(err) => panic!(
                "cannot pack tribe '{}': {err}; audit the tribe set in your test suite to catch illegal targets",
                tribe.name()
            ),
        })
        .collect();

    keyed.sort_by(|(lhs, _), (rhs, _)| lhs.cmp(rhs));
    keyed.into_iter().map(|(_, tribe)| tribe).collect()
}

/// Indices of the tribes not yet covered by `current`, in plan order.
///
/// A tribe is excluded iff the checkpoint resolves to a literal target
/// and `tribe.target <= checkpoint`: once any literal checkpoint exists
/// the initial pass has happened, so `First` drops out; literals at or
/// below the checkpoint drop out; `Always` never compares at-or-below a
/// literal, so it stays in on every pass. With no checkpoint (`First`)
/// every tribe is included.
pub(crate) fn not_yet_migrated(tribes: &[TribeDescriptor], current: &Target) -> Result<Vec<usize>> {
    let mut pending = Vec::with_capacity(tribes.len());
    for (index, tribe) in tribes.iter().enumerate() {
        if matches!(current, Target::Literal(_)) && tribe.target().less_or_equal(current)? {
            continue;
        }
        pending.push(index);
    }

    Ok(pending)
}
