//! Canned tribe descriptors.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use caravan_core::TribeDescriptor;
use caravan_target::Target;

/// A tribe whose action succeeds immediately.
pub fn noop_tribe(name: &str, target: Target) -> TribeDescriptor {
    TribeDescriptor::from_fn(name, target, || async { Ok(()) })
}

/// A tribe whose action fails with `message`.
pub fn failing_tribe(name: &str, target: Target, message: &str) -> TribeDescriptor {
    let message = message.to_string();
    TribeDescriptor::from_fn(name, target, move || {
        let message = message.clone();
        async move { Err(message.into()) }
    })
}

/// A tribe that sleeps for `delay` before succeeding.
pub fn slow_tribe(name: &str, target: Target, delay: Duration) -> TribeDescriptor {
    TribeDescriptor::from_fn(name, target, move || async move {
        tokio::time::sleep(delay).await;
        Ok(())
    })
}

/// A tribe that bumps `counter` on every successful run.
pub fn counting_tribe(name: &str, target: Target, counter: Arc<AtomicUsize>) -> TribeDescriptor {
    TribeDescriptor::from_fn(name, target, move || {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    })
}

/// A tribe that appends its name to `log` when it runs, for asserting
/// execution order across a whole plan.
pub fn recording_tribe(name: &str, target: Target, log: Arc<Mutex<Vec<String>>>) -> TribeDescriptor {
    let entry = name.to_string();
    TribeDescriptor::from_fn(name, target, move || {
        let log = Arc::clone(&log);
        let entry = entry.clone();
        async move {
            log.lock().unwrap().push(entry);
            Ok(())
        }
    })
}
