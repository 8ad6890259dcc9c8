//! A listener that records every lifecycle notification.

use std::sync::{Arc, Mutex};

use caravan_core::{Error, MigrationListener};
use caravan_target::Target;

/// One recorded lifecycle notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    WillStart,
    DidMigrate(Target),
    DidFinish,
    /// Carries the interrupting error's display string.
    DidInterrupt(String),
}

/// Records lifecycle events for later assertions.
///
/// Cloning shares the underlying log, so tests keep a clone and hand the
/// original to [`Caravan::with_listener`](caravan_core::Caravan::with_listener).
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, in notification order.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Targets passed to `did_migrate`, in notification order.
    pub fn migrated_targets(&self) -> Vec<Target> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::DidMigrate(target) => Some(target),
                _ => None,
            })
            .collect()
    }

    /// Display strings of errors passed to `did_interrupt_migration`.
    pub fn interruptions(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::DidInterrupt(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn finished(&self) -> bool {
        self.events().contains(&Event::DidFinish)
    }
}

impl MigrationListener for RecordingListener {
    fn will_start_migration(&self) {
        self.events.lock().unwrap().push(Event::WillStart);
    }

    fn did_migrate(&self, target: &Target) {
        self.events
            .lock()
            .unwrap()
            .push(Event::DidMigrate(target.clone()));
    }

    fn did_finish_migration(&self) {
        self.events.lock().unwrap().push(Event::DidFinish);
    }

    fn did_interrupt_migration(&self, error: &Error) {
        self.events
            .lock()
            .unwrap()
            .push(Event::DidInterrupt(error.to_string()));
    }
}
