//! Tribes: the unit of migration work.

use std::fmt;
use std::future::Future;

use async_trait::async_trait;
use caravan_target::Target;

/// Error type tribes may return from their migration action.
pub type TribeError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// One discrete migration step.
///
/// Implementations carry no state between invocations: the engine builds
/// a fresh instance right before the tribe runs and drops it right after.
#[async_trait]
pub trait Tribe: Send {
    /// Perform this tribe's migration work.
    async fn migrate(&mut self) -> std::result::Result<(), TribeError>;
}

type TribeFactory = Box<dyn Fn() -> Box<dyn Tribe> + Send + Sync>;

/// A declared tribe: a name for diagnostics, the target deciding when it
/// runs, and a factory producing a fresh instance per run.
pub struct TribeDescriptor {
    name: String,
    target: Target,
    factory: TribeFactory,
}

impl TribeDescriptor {
    /// Declare a tribe backed by a [`Tribe`] implementation.
    pub fn new<T, F>(name: impl Into<String>, target: Target, factory: F) -> Self
    where
        T: Tribe + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            target,
            factory: Box::new(move || Box::new(factory())),
        }
    }

    /// Declare a tribe backed by an async closure.
    pub fn from_fn<F, Fut>(name: impl Into<String>, target: Target, action: F) -> Self
    where
        F: Fn() -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<(), TribeError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            target,
            factory: Box::new(move || Box::new(FnTribe(action.clone()))),
        }
    }

    /// The tribe's diagnostic name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The target deciding when this tribe runs.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Build a fresh instance for one run.
    pub(crate) fn instantiate(&self) -> Box<dyn Tribe> {
        (self.factory)()
    }
}

impl fmt::Debug for TribeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TribeDescriptor")
            .field("name", &self.name)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

struct FnTribe<F>(F);

#[async_trait]
impl<F, Fut> Tribe for FnTribe<F>
where
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = std::result::Result<(), TribeError>> + Send + 'static,
{
    async fn migrate(&mut self) -> std::result::Result<(), TribeError> {
        (self.0)().await
    }
}
