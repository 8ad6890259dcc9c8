//! Instrumented checkpoint stores.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use caravan_core::{CheckpointStore, MemoryStore, StoreError};

/// Wraps a store and counts the calls reaching it.
#[derive(Debug)]
pub struct CountingStore<S> {
    inner: S,
    sets: Arc<AtomicUsize>,
    flushes: Arc<AtomicUsize>,
}

impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            sets: Arc::new(AtomicUsize::new(0)),
            flushes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handle observing the number of `set` calls.
    pub fn sets(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.sets)
    }

    /// Handle observing the number of `flush` calls.
    pub fn flushes(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.flushes)
    }
}

#[async_trait]
impl<S: CheckpointStore> CheckpointStore for CountingStore<S> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key).await
    }

    async fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value).await
    }

    async fn flush(&mut self) -> Result<(), StoreError> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        self.inner.flush().await
    }
}

/// An in-memory store whose `set` or `flush` can be made to fail.
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_set: bool,
    fail_flush: bool,
}

impl FailingStore {
    pub fn failing_set() -> Self {
        Self {
            fail_set: true,
            ..Self::default()
        }
    }

    pub fn failing_flush() -> Self {
        Self {
            fail_flush: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl CheckpointStore for FailingStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key).await
    }

    async fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_set {
            return Err("set refused".into());
        }
        self.inner.set(key, value).await
    }

    async fn flush(&mut self) -> Result<(), StoreError> {
        if self.fail_flush {
            return Err("flush refused".into());
        }
        self.inner.flush().await
    }
}
