//! The serial migration engine.

use caravan_target::Target;

use crate::error::{Error, Result};
use crate::listener::{MigrationListener, NoopListener};
use crate::plan;
use crate::store::{CHECKPOINT_KEY, CheckpointStore};
use crate::tribe::TribeDescriptor;

/// Orders and executes packed tribes against a checkpoint store.
///
/// A `Caravan` owns the registered tribe set (sorted at pack time), the
/// checkpoint store, and an optional lifecycle listener. Each call to
/// [`migrate`](Caravan::migrate) runs one pipeline: plan from the current
/// checkpoint, execute the pending tribes strictly one at a time,
/// advance the checkpoint after each successful literal tribe, and halt
/// on the first failure.
///
/// # Caller obligations
///
/// - At most one migration may be in flight against a given backing
///   store. `migrate` taking `&mut self` enforces this per engine;
///   sharing one store across several engines is not supported and may
///   interleave checkpoint writes unpredictably.
/// - There is no cancellation and no engine-imposed timeout: a slow
///   tribe stalls the pipeline until its future settles. Wrap the whole
///   call in an external timeout if you need one.
/// - Listener callbacks run without any internal locking; treat them as
///   potentially reentrant-unsafe.
///
/// # Example
///
/// ```
/// use caravan_core::{Caravan, MemoryStore, TribeDescriptor};
/// use caravan_target::Target;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> caravan_core::Result<()> {
/// let tribes = vec![
///     TribeDescriptor::from_fn("settings-layout-v2", Target::literal("2.0.0"), || async {
///         // move settings to the new layout
///         Ok(())
///     }),
///     TribeDescriptor::from_fn("rebuild-cache", Target::Always, || async { Ok(()) }),
/// ];
///
/// let mut caravan = Caravan::pack(tribes, MemoryStore::new());
/// caravan.migrate().await?;
/// assert_eq!(caravan.current_target().await?, Target::literal("2.0.0"));
/// # Ok(())
/// # }
/// ```
pub struct Caravan<S> {
    tribes: Vec<TribeDescriptor>,
    store: S,
    listener: Box<dyn MigrationListener>,
}

impl<S: CheckpointStore> Caravan<S> {
    /// Pack `tribes` into migration order over `store`.
    ///
    /// Order of the input is irrelevant: tribes are sorted by target
    /// (`First`, then literals ascending, then `Always`), with equal
    /// targets keeping their declaration order.
    ///
    /// # Panics
    ///
    /// Panics if any declared target is not SemVer compliant. This is a
    /// deliberate hard stop for malformed static configuration; use
    /// [`audit`](crate::audit::audit) in your test suite so it can never
    /// fire in production.
    pub fn pack(tribes: Vec<TribeDescriptor>, store: S) -> Self {
        Self {
            tribes: plan::sort_by_target(tribes),
            store,
            listener: Box::new(NoopListener),
        }
    }

    /// Replace the packed tribe set, keeping the store and listener.
    ///
    /// Intended for re-registration between invocations: adding tribes,
    /// or retrying after a failure with the offending tribe fixed.
    ///
    /// # Panics
    ///
    /// As [`pack`](Caravan::pack).
    pub fn repack(mut self, tribes: Vec<TribeDescriptor>) -> Self {
        self.tribes = plan::sort_by_target(tribes);
        self
    }

    /// Attach the lifecycle listener notified during [`migrate`](Caravan::migrate).
    pub fn with_listener(mut self, listener: impl MigrationListener + 'static) -> Self {
        self.listener = Box::new(listener);
        self
    }

    /// The target of the last successfully migrated literal tribe.
    ///
    /// `First` when no checkpoint has ever been persisted, including
    /// when only `First`- or `Always`-targeted tribes have run, since
    /// those never update the checkpoint.
    pub async fn current_target(&self) -> Result<Target> {
        let value = self.store.get(CHECKPOINT_KEY).await.map_err(Error::Store)?;
        Ok(match value {
            Some(raw) => Target::Literal(raw),
            None => Target::First,
        })
    }

    /// The tribes a [`migrate`](Caravan::migrate) call would run now, in order.
    pub async fn plan(&self) -> Result<Vec<&TribeDescriptor>> {
        let current = self.current_target().await?;
        let pending = plan::not_yet_migrated(&self.tribes, &current)?;
        Ok(pending.into_iter().map(|index| &self.tribes[index]).collect())
    }

    /// Run one migration pass.
    ///
    /// Plans from the current checkpoint, then executes the pending
    /// tribes strictly sequentially: a fresh instance per tribe, each
    /// action awaited to settlement before the next starts. After each
    /// success the checkpoint advances if the tribe's target is a
    /// literal, and the listener receives `did_migrate`. The first
    /// failure halts the pipeline: remaining tribes do not run, the
    /// cause is wrapped as [`Error::TribeMigrationFailed`], the listener
    /// receives `did_interrupt_migration`, and the checkpoint stays
    /// where the last success left it. The store is flushed exactly once
    /// per invocation, success or failure.
    pub async fn migrate(&mut self) -> Result<()> {
        let current = self.current_target().await?;
        let pending = plan::not_yet_migrated(&self.tribes, &current)?;
        tracing::debug!(current = %current, pending = pending.len(), "starting migration");

        self.listener.will_start_migration();

        let mut failure: Option<Error> = None;
        for index in pending {
            let tribe = &self.tribes[index];
            let target = tribe.target().clone();
            tracing::debug!(tribe = tribe.name(), target = %target, "migrating tribe");

            let mut instance = tribe.instantiate();
            match instance.migrate().await {
                Ok(()) => {
                    if let Target::Literal(version) = &target {
                        if let Err(err) = self.store.set(CHECKPOINT_KEY, version).await {
                            failure = Some(Error::Store(err));
                            break;
                        }
                    }
                    self.listener.did_migrate(&target);
                }
                Err(cause) => {
                    tracing::warn!(tribe = tribe.name(), target = %target, %cause, "tribe failed, halting");
                    failure = Some(Error::TribeMigrationFailed(cause.to_string()));
                    break;
                }
            }
        }

        // Exactly one flush per invocation, success or failure.
        let flushed = self.store.flush().await.map_err(Error::Store);
        let outcome = match (failure, flushed) {
            (None, Ok(())) => Ok(()),
            (None, Err(err)) => Err(err),
            (Some(err), Ok(())) => Err(err),
            (Some(err), Err(flush_err)) => {
                tracing::warn!(error = %flush_err, "flush failed after interrupted migration");
                Err(err)
            }
        };

        match outcome {
            Ok(()) => {
                tracing::debug!("migration finished");
                self.listener.did_finish_migration();
                Ok(())
            }
            Err(error) => {
                self.listener.did_interrupt_migration(&error);
                Err(error)
            }
        }
    }
}
