//! Reducer type and composition combinators.
//!
//! A reducer is the only place state transitions happen. It must be a
//! pure function of `(state, action, environment)`; all I/O goes into
//! the returned [`Effect`]. Reducers never fail: domain errors become
//! state, mismatched actions are skipped.

use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use super::accessor::{ActionPrism, StateLens};
use super::effect::Effect;

/// Element of an identity-keyed collection, addressable by its id.
pub trait Identified {
    type Id: PartialEq + Clone + fmt::Debug + Send + Sync + 'static;

    fn id(&self) -> Self::Id;
}

/// Pure state-transition function, composable from smaller reducers.
pub struct Reducer<S, A, E> {
    run: Arc<dyn Fn(&mut S, A, &E) -> Effect<A> + Send + Sync>,
}

impl<S, A, E> Clone for Reducer<S, A, E> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
        }
    }
}

struct ScopeEntry<S, A, E> {
    key: String,
    prefix: String,
    reducer: Reducer<S, A, E>,
}

impl<S, A, E> Reducer<S, A, E>
where
    S: 'static,
    A: 'static,
    E: 'static,
{
    pub fn new(run: impl Fn(&mut S, A, &E) -> Effect<A> + Send + Sync + 'static) -> Self {
        Self { run: Arc::new(run) }
    }

    /// Reducer that ignores every action.
    pub fn empty() -> Self {
        Self::new(|_, _, _| Effect::none())
    }

    pub fn reduce(&self, state: &mut S, action: A, environment: &E) -> Effect<A> {
        (self.run)(state, action, environment)
    }

    /// Run `reducers` against the same (state, action) in fixed order,
    /// merging their effects.
    ///
    /// Order matters for the state mutations: a reducer may
    /// intentionally fall through on one facet of an action so a later
    /// one can handle another.
    pub fn combine(reducers: impl IntoIterator<Item = Self>) -> Self
    where
        A: Clone,
    {
        let reducers: Vec<Self> = reducers.into_iter().collect();
        Self::new(move |state, action, environment| {
            let mut effects = Vec::new();
            for reducer in &reducers {
                let effect = reducer.reduce(state, action.clone(), environment);
                if !effect.is_none() {
                    effects.push(effect);
                }
            }
            match effects.len() {
                0 => Effect::none(),
                1 => effects.swap_remove(0),
                // Sibling effects run concurrently, they are not a chain.
                _ => Effect::Merge(effects),
            }
        })
    }

    /// Defer construction until the first action arrives.
    ///
    /// Required for recursive reducer trees: a screen that can push
    /// another instance of itself builds each level on demand.
    pub fn lazy(build: impl Fn() -> Self + Send + Sync + 'static) -> Self {
        let cell: OnceLock<Self> = OnceLock::new();
        Self::new(move |state, action, environment| {
            cell.get_or_init(&build).reduce(state, action, environment)
        })
    }

    /// Lift this reducer over an optional substate.
    ///
    /// An action arriving while the substate is absent is a silent
    /// no-op: dispatch racing a dismiss is a normal condition.
    pub fn optional(self) -> Reducer<Option<S>, A, E> {
        Reducer::new(move |state, action, environment| match state {
            Some(state) => self.reduce(state, action, environment),
            None => {
                tracing::debug!("action dropped: substate is absent");
                Effect::none()
            }
        })
    }

    /// Lift this reducer into a parent domain via an accessor pair.
    ///
    /// Skips when the action does not decode to the child's variant or
    /// the child substate is absent; otherwise runs against the
    /// projected substate and re-embeds produced effects.
    pub fn pullback<PS, PA>(
        self,
        state: StateLens<PS, S>,
        action: ActionPrism<PA, A>,
    ) -> Reducer<PS, PA, E>
    where
        PS: 'static,
        PA: 'static,
        A: Send,
    {
        Reducer::new(move |parent, parent_action: PA, environment| {
            let Some(child_action) = action.extract(&parent_action) else {
                return Effect::none();
            };
            let Some(child) = state.project(parent) else {
                tracing::debug!("child action dropped: substate is absent");
                return Effect::none();
            };
            let embed = action.embedder();
            self.reduce(child, child_action, environment)
                .map(move |a| embed(a))
        })
    }

    /// Apply this reducer to the collection element named by the id
    /// inside the action. An unknown id is a no-op, never a fault.
    pub fn for_each<PS, PA>(
        self,
        elements: impl Fn(&mut PS) -> &mut Vec<S> + Send + Sync + 'static,
        extract: impl Fn(&PA) -> Option<(S::Id, A)> + Send + Sync + 'static,
        embed: impl Fn(S::Id, A) -> PA + Send + Sync + 'static,
    ) -> Reducer<PS, PA, E>
    where
        S: Identified,
        PS: 'static,
        PA: 'static,
        A: Send,
    {
        let embed = Arc::new(embed);
        Reducer::new(move |parent, parent_action: PA, environment| {
            let Some((id, child_action)) = extract(&parent_action) else {
                return Effect::none();
            };
            let collection = elements(parent);
            let Some(element) = collection.iter_mut().find(|e| e.id() == id) else {
                tracing::debug!(id = ?id, "action dropped: no element with this id");
                return Effect::none();
            };
            let embed = Arc::clone(&embed);
            self.reduce(element, child_action, environment)
                .map(move |a| embed(id.clone(), a))
        })
    }

    /// Re-scope this reducer on a key derived from state.
    ///
    /// The inner reducer is rebuilt whenever `key` changes between
    /// successive reductions, and every effect it produced under the
    /// previous key is explicitly cancelled first, so a stale result
    /// can never land in the new key's state.
    pub fn with_state<K>(
        scope: &'static str,
        key: impl Fn(&S) -> K + Send + Sync + 'static,
        build: impl Fn(&S) -> Self + Send + Sync + 'static,
    ) -> Self
    where
        K: fmt::Display,
    {
        let cache: Mutex<Option<ScopeEntry<S, A, E>>> = Mutex::new(None);
        Self::new(move |state, action, environment| {
            let current = key(state).to_string();

            let mut cancel_stale = Effect::none();
            let (reducer, prefix) = {
                let mut guard = cache.lock();
                if guard.as_ref().is_some_and(|entry| entry.key != current) {
                    if let Some(previous) = guard.take() {
                        tracing::debug!(
                            scope,
                            from = %previous.key,
                            to = %current,
                            "re-scoping reducer, cancelling stale effects"
                        );
                        cancel_stale = Effect::cancel_prefix(previous.prefix);
                    }
                }
                if guard.is_none() {
                    let prefix = format!("{scope}/{current}");
                    let reducer = build(state);
                    *guard = Some(ScopeEntry {
                        key: current,
                        prefix,
                        reducer,
                    });
                }
                match &*guard {
                    Some(entry) => (entry.reducer.clone(), entry.prefix.clone()),
                    // Just initialized above.
                    None => return Effect::none(),
                }
            };

            let effect = reducer.reduce(state, action, environment).scoped(&prefix);
            cancel_stale.append(effect)
        })
    }
}
