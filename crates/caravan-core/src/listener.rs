//! Lifecycle notifications for the migration pipeline.

use caravan_target::Target;

use crate::error::Error;

/// Receives notifications about the migration lifecycle.
///
/// Every method defaults to a no-op, so implementors override only what
/// they care about. Callbacks are invoked synchronously from whatever
/// context the engine's futures complete on; the engine takes no locks
/// around them, so reentrancy safety is the implementor's obligation.
pub trait MigrationListener: Send + Sync {
    /// Called when the migration process is about to start.
    fn will_start_migration(&self) {}

    /// Called after each successful tribe migration.
    fn did_migrate(&self, _target: &Target) {}

    /// Called when all planned tribes have been migrated.
    fn did_finish_migration(&self) {}

    /// Called when a tribe has failed and the migration halted.
    fn did_interrupt_migration(&self, _error: &Error) {}
}

/// Listener that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl MigrationListener for NoopListener {}
