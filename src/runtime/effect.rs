//! Effect descriptions and identity-based cancellation.
//!
//! An [`Effect`] describes follow-up work a reducer wants done after
//! its synchronous mutation step: feed more actions back in, run
//! asynchronous work, or cancel in-flight work. Effects are inert
//! values; the store interprets them.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use uuid::Uuid;

/// Stable identity for a cancellable effect.
///
/// Starting a new effect under an identity that is already in use
/// cancels the previous one. Identities compose hierarchically:
/// a scope prefix (`scope/key`) is joined to an inner identity with
/// `::`, and cancelling a prefix cancels everything underneath it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EffectId(String);

impl EffectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identity under a named scope, keyed by a state-derived value.
    pub fn scoped(scope: &str, key: impl fmt::Display) -> Self {
        Self(format!("{scope}/{key}"))
    }

    /// Unique per-instance identity.
    pub fn fresh() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this identity falls under `prefix`.
    pub(crate) fn is_within(&self, prefix: &str) -> bool {
        self.0 == prefix
            || self
                .0
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with("::"))
    }

    fn prefixed(&self, prefix: &str) -> Self {
        Self(format!("{prefix}::{}", self.0))
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Asynchronous unit of work resolving to zero or one follow-up action.
pub struct FutureEffect<A> {
    pub(crate) id: Option<EffectId>,
    pub(crate) future: BoxFuture<'static, Option<A>>,
}

/// Description of pending work produced by a reduction.
///
/// Synchronous variants (`Action`, `Sequence`) re-enter the store's
/// queue in produced order; `Future` work runs concurrently and may be
/// cancelled through its identity. `Concat` sequences whole effects:
/// a part after asynchronous work starts only once that work is done.
/// `Merge` runs effects concurrently; sibling reducers' effects are
/// merged, never sequenced.
pub enum Effect<A> {
    None,
    Action(A),
    Sequence(Vec<A>),
    Future(FutureEffect<A>),
    Cancel(EffectId),
    CancelPrefix(String),
    Concat(Vec<Effect<A>>),
    Merge(Vec<Effect<A>>),
}

impl<A> Effect<A> {
    pub fn none() -> Self {
        Effect::None
    }

    /// A single follow-up action.
    pub fn action(action: A) -> Self {
        Effect::Action(action)
    }

    /// A finite ordered sequence of follow-up actions.
    pub fn sequence(actions: impl IntoIterator<Item = A>) -> Self {
        let actions: Vec<A> = actions.into_iter().collect();
        if actions.is_empty() {
            Effect::None
        } else {
            Effect::Sequence(actions)
        }
    }

    /// Asynchronous work yielding zero or one action.
    pub fn future(future: impl Future<Output = Option<A>> + Send + 'static) -> Self {
        Effect::Future(FutureEffect {
            id: None,
            future: future.boxed(),
        })
    }

    /// Asynchronous work whose outcome feeds nothing back.
    pub fn fire_and_forget(future: impl Future<Output = ()> + Send + 'static) -> Self {
        Effect::Future(FutureEffect {
            id: None,
            future: future.map(|_| None).boxed(),
        })
    }

    /// Cancel the in-flight effect with this exact identity.
    pub fn cancel(id: EffectId) -> Self {
        Effect::Cancel(id)
    }

    /// Cancel every in-flight effect whose identity falls under `prefix`.
    pub fn cancel_prefix(prefix: impl Into<String>) -> Self {
        Effect::CancelPrefix(prefix.into())
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Effect::None)
    }

    /// Tag the asynchronous parts of this effect with a cancellation
    /// identity. Parts that already carry an identity keep it.
    pub fn cancellable(self, id: EffectId) -> Self {
        match self {
            Effect::Future(FutureEffect { id: None, future }) => Effect::Future(FutureEffect {
                id: Some(id),
                future,
            }),
            Effect::Concat(effects) => Effect::Concat(
                effects
                    .into_iter()
                    .map(|e| e.cancellable(id.clone()))
                    .collect(),
            ),
            Effect::Merge(effects) => Effect::Merge(
                effects
                    .into_iter()
                    .map(|e| e.cancellable(id.clone()))
                    .collect(),
            ),
            other => other,
        }
    }

    /// Sequence `other` after this effect.
    pub fn append(self, other: Effect<A>) -> Self {
        match (self, other) {
            (Effect::None, other) => other,
            (this, Effect::None) => this,
            (Effect::Concat(mut effects), Effect::Concat(tail)) => {
                effects.extend(tail);
                Effect::Concat(effects)
            }
            (Effect::Concat(mut effects), other) => {
                effects.push(other);
                Effect::Concat(effects)
            }
            (this, Effect::Concat(tail)) => {
                let mut effects = vec![this];
                effects.extend(tail);
                Effect::Concat(effects)
            }
            (this, other) => Effect::Concat(vec![this, other]),
        }
    }

    /// Re-key cancellation identities under a scope prefix.
    ///
    /// Untagged asynchronous work is tagged with the bare prefix so a
    /// later prefix-cancel reaches it too.
    pub(crate) fn scoped(self, prefix: &str) -> Self {
        match self {
            Effect::Future(FutureEffect { id, future }) => Effect::Future(FutureEffect {
                id: Some(match id {
                    Some(id) => id.prefixed(prefix),
                    None => EffectId::new(prefix),
                }),
                future,
            }),
            Effect::Cancel(id) => Effect::Cancel(id.prefixed(prefix)),
            Effect::CancelPrefix(p) => Effect::CancelPrefix(format!("{prefix}::{p}")),
            Effect::Concat(effects) => {
                Effect::Concat(effects.into_iter().map(|e| e.scoped(prefix)).collect())
            }
            Effect::Merge(effects) => {
                Effect::Merge(effects.into_iter().map(|e| e.scoped(prefix)).collect())
            }
            other => other,
        }
    }

    /// Transform the actions this effect produces.
    pub fn map<B>(self, transform: impl Fn(A) -> B + Send + Sync + 'static) -> Effect<B>
    where
        A: Send + 'static,
        B: 'static,
    {
        self.map_shared(Arc::new(transform))
    }

    fn map_shared<B>(self, transform: Arc<dyn Fn(A) -> B + Send + Sync>) -> Effect<B>
    where
        A: Send + 'static,
        B: 'static,
    {
        match self {
            Effect::None => Effect::None,
            Effect::Action(a) => Effect::Action(transform(a)),
            Effect::Sequence(actions) => {
                Effect::Sequence(actions.into_iter().map(|a| transform(a)).collect())
            }
            Effect::Future(FutureEffect { id, future }) => Effect::Future(FutureEffect {
                id,
                future: future.map(move |out| out.map(|a| transform(a))).boxed(),
            }),
            Effect::Cancel(id) => Effect::Cancel(id),
            Effect::CancelPrefix(p) => Effect::CancelPrefix(p),
            Effect::Concat(effects) => Effect::Concat(
                effects
                    .into_iter()
                    .map(|e| e.map_shared(Arc::clone(&transform)))
                    .collect(),
            ),
            Effect::Merge(effects) => Effect::Merge(
                effects
                    .into_iter()
                    .map(|e| e.map_shared(Arc::clone(&transform)))
                    .collect(),
            ),
        }
    }
}

impl<A> fmt::Debug for Effect<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::None => f.write_str("Effect::None"),
            Effect::Action(_) => f.write_str("Effect::Action"),
            Effect::Sequence(actions) => write!(f, "Effect::Sequence(len={})", actions.len()),
            Effect::Future(fut) => write!(f, "Effect::Future(id={:?})", fut.id),
            Effect::Cancel(id) => write!(f, "Effect::Cancel({id})"),
            Effect::CancelPrefix(p) => write!(f, "Effect::CancelPrefix({p})"),
            Effect::Concat(effects) => write!(f, "Effect::Concat(len={})", effects.len()),
            Effect::Merge(effects) => write!(f, "Effect::Merge(len={})", effects.len()),
        }
    }
}
