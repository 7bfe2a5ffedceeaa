//! Generic loading-state machine for externally fetched values.
//!
//! Every collection the app fetches from storage goes through the same
//! machine; only the value type and the loader vary.

use futures::future::BoxFuture;

use super::effect::{Effect, EffectId};
use super::reducer::Reducer;

/// Loading phase of an [`AsyncResource`].
#[derive(Debug, Clone, PartialEq)]
pub enum Phase<V, F> {
    Initial,
    Loading,
    Loaded(Result<V, F>),
}

/// Actions driving the resource machine.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceAction<V, F> {
    StartLoading,
    ResultReceived(Result<V, F>),
}

/// Externally fetched value with its loading state.
///
/// Carries a stable per-instance identity used to cancel an in-flight
/// load when a new one starts. The identity is plumbing, not data:
/// equality compares the phase only.
#[derive(Debug, Clone)]
pub struct AsyncResource<V, F> {
    id: EffectId,
    phase: Phase<V, F>,
}

impl<V, F> Default for AsyncResource<V, F> {
    fn default() -> Self {
        Self::initial()
    }
}

impl<V, F> PartialEq for AsyncResource<V, F>
where
    V: PartialEq,
    F: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.phase == other.phase
    }
}

impl<V, F> AsyncResource<V, F> {
    pub fn initial() -> Self {
        Self {
            id: EffectId::fresh(),
            phase: Phase::Initial,
        }
    }

    pub fn phase(&self) -> &Phase<V, F> {
        &self.phase
    }

    pub fn is_initial(&self) -> bool {
        matches!(self.phase, Phase::Initial)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading)
    }

    /// The loaded result, if any.
    pub fn result(&self) -> Option<&Result<V, F>> {
        match &self.phase {
            Phase::Loaded(result) => Some(result),
            _ => None,
        }
    }

    /// The successfully loaded value, if any.
    pub fn value(&self) -> Option<&V> {
        self.result().and_then(|r| r.as_ref().ok())
    }

    /// The load failure, if any.
    pub fn error(&self) -> Option<&F> {
        self.result().and_then(|r| r.as_ref().err())
    }
}

impl<V, F> AsyncResource<V, F>
where
    V: Send + 'static,
    F: Send + 'static,
{
    /// Reducer for this resource, loading through `load`.
    ///
    /// `StartLoading` is valid from any phase: it discards a previous
    /// result, transitions to `Loading` and launches the loader under
    /// the instance identity, cancelling any load still in flight.
    /// `ResultReceived` only lands while `Loading`; anything else is a
    /// logged no-op (a superseded load never even gets this far, its
    /// result is suppressed by cancellation).
    pub fn reducer<E>(
        load: impl Fn(&E) -> BoxFuture<'static, Result<V, F>> + Send + Sync + 'static,
    ) -> Reducer<Self, ResourceAction<V, F>, E>
    where
        E: 'static,
    {
        Reducer::new(move |state: &mut Self, action, environment| match action {
            ResourceAction::StartLoading => {
                state.phase = Phase::Loading;
                let pending = load(environment);
                Effect::future(async move { Some(ResourceAction::ResultReceived(pending.await)) })
                    .cancellable(state.id.clone())
            }
            ResourceAction::ResultReceived(result) => {
                if state.is_loading() {
                    state.phase = Phase::Loaded(result);
                } else {
                    tracing::debug!("resource result ignored outside the Loading phase");
                }
                Effect::none()
            }
        })
    }
}
