//! Store: owns root state, serializes reductions, executes effects.
//!
//! Actions may arrive from any number of concurrent tasks, but they
//! are applied on a single worker so reductions never interleave.
//! Asynchronous effects run concurrently with the worker; each one can
//! be registered under an [`EffectId`] so a later effect with the same
//! identity supersedes it. Cancellation both aborts the running task
//! and bumps an epoch, so a result that already made it into the queue
//! before the cancellation is still dropped.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, watch, Notify};
use tokio::task::{AbortHandle, JoinHandle};

use super::effect::{Effect, EffectId, FutureEffect};
use super::reducer::Reducer;

enum Envelope<A> {
    Action(A),
    Feedback {
        action: A,
        id: EffectId,
        epoch: u64,
    },
    /// Remainder of an effect chain whose asynchronous part finished.
    Resume(VecDeque<Effect<A>>),
}

struct Slot {
    epoch: u64,
    abort: AbortHandle,
}

#[derive(Default)]
struct EffectSlots {
    slots: HashMap<EffectId, Slot>,
    next_epoch: u64,
}

impl EffectSlots {
    fn allocate_epoch(&mut self) -> u64 {
        self.next_epoch += 1;
        self.next_epoch
    }

    /// Register a new in-flight effect, superseding any previous one
    /// under the same identity.
    fn register(&mut self, id: EffectId, epoch: u64, abort: AbortHandle) {
        if let Some(previous) = self.slots.insert(id.clone(), Slot { epoch, abort }) {
            tracing::debug!(%id, "superseding in-flight effect");
            previous.abort.abort();
        }
    }

    /// Whether a completed effect is still the current one under its
    /// identity; removes the slot when it is.
    fn take_current(&mut self, id: &EffectId, epoch: u64) -> bool {
        match self.slots.get(id) {
            Some(slot) if slot.epoch == epoch => {
                self.slots.remove(id);
                true
            }
            _ => false,
        }
    }

    fn cancel(&mut self, id: &EffectId) {
        if let Some(slot) = self.slots.remove(id) {
            tracing::debug!(%id, "effect cancelled");
            slot.abort.abort();
        }
    }

    fn cancel_prefix(&mut self, prefix: &str) {
        let stale: Vec<EffectId> = self
            .slots
            .keys()
            .filter(|id| id.is_within(prefix))
            .cloned()
            .collect();
        for id in stale {
            self.cancel(&id);
        }
    }
}

/// Tracks queued actions plus live effect tasks, for [`Store::until_idle`].
#[derive(Default)]
struct Pending {
    count: AtomicUsize,
    idle: Notify,
}

impl Pending {
    fn add(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    fn done(&self) {
        if self.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }

    async fn wait_idle(&self) {
        loop {
            // Subscribe to the notification BEFORE checking the count,
            // otherwise done() can fire between the check and the await
            // and the wake-up is lost.
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.count.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Decrements the pending count when the owning effect task ends,
/// whether it completed or was aborted mid-await.
struct PendingGuard(Arc<Pending>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.done();
    }
}

/// State container serializing all action processing.
///
/// Must be created inside a tokio runtime; the worker task and all
/// effect tasks are spawned onto it.
pub struct Store<S, A> {
    actions: mpsc::UnboundedSender<Envelope<A>>,
    state_rx: watch::Receiver<S>,
    pending: Arc<Pending>,
    worker: JoinHandle<()>,
}

impl<S, A> Store<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Send + 'static,
{
    pub fn new<E>(initial: S, reducer: Reducer<S, A, E>, environment: E) -> Self
    where
        E: Send + 'static,
    {
        let (actions, mut inbox) = mpsc::unbounded_channel::<Envelope<A>>();
        let (state_tx, state_rx) = watch::channel(initial.clone());
        let pending = Arc::new(Pending::default());

        let feedback = actions.clone();
        let tracker = Arc::clone(&pending);
        let worker = tokio::spawn(async move {
            let mut state = initial;
            let mut slots = EffectSlots::default();
            while let Some(envelope) = inbox.recv().await {
                let action = match envelope {
                    Envelope::Action(action) => Some(action),
                    Envelope::Feedback { action, id, epoch } => {
                        if slots.take_current(&id, epoch) {
                            Some(action)
                        } else {
                            tracing::debug!(%id, "stale effect result dropped");
                            None
                        }
                    }
                    Envelope::Resume(chain) => {
                        run_chain(chain, &mut slots, &feedback, &tracker);
                        None
                    }
                };
                if let Some(action) = action {
                    let effect = reducer.reduce(&mut state, action, &environment);
                    state_tx.send_replace(state.clone());
                    run_effect(effect, &mut slots, &feedback, &tracker);
                }
                tracker.done();
            }
        });

        Self {
            actions,
            state_rx,
            pending,
            worker,
        }
    }

    /// Enqueue an action for processing.
    pub fn send(&self, action: A) {
        self.pending.add();
        if self.actions.send(Envelope::Action(action)).is_err() {
            self.pending.done();
            tracing::warn!("action dropped: store worker is gone");
        }
    }

    /// Snapshot of the state after the most recent completed reduction.
    pub fn state(&self) -> S {
        self.state_rx.borrow().clone()
    }

    /// Observe the state after every completed reduction.
    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.state_rx.clone()
    }

    /// Wait until the action queue is empty and no effect is in flight.
    pub async fn until_idle(&self) {
        self.pending.wait_idle().await;
    }
}

impl<S, A> Drop for Store<S, A> {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

fn run_effect<A: Send + 'static>(
    effect: Effect<A>,
    slots: &mut EffectSlots,
    feedback: &mpsc::UnboundedSender<Envelope<A>>,
    pending: &Arc<Pending>,
) {
    match effect {
        Effect::None => {}
        Effect::Action(action) => {
            pending.add();
            let _ = feedback.send(Envelope::Action(action));
        }
        Effect::Sequence(actions) => {
            for action in actions {
                pending.add();
                let _ = feedback.send(Envelope::Action(action));
            }
        }
        Effect::Merge(effects) => {
            for effect in effects {
                run_effect(effect, slots, feedback, pending);
            }
        }
        Effect::Cancel(id) => slots.cancel(&id),
        Effect::CancelPrefix(prefix) => slots.cancel_prefix(&prefix),
        chain @ (Effect::Future(_) | Effect::Concat(_)) => {
            run_chain(VecDeque::from([chain]), slots, feedback, pending);
        }
    }
}

/// Execute a chain of effects in order.
///
/// Synchronous parts run immediately; at the first asynchronous part
/// the remainder of the chain moves into the spawned task, which sends
/// it back as [`Envelope::Resume`] once the work completes. Aborting
/// the in-flight part (cancellation, supersession) therefore drops the
/// rest of the chain with it.
fn run_chain<A: Send + 'static>(
    mut chain: VecDeque<Effect<A>>,
    slots: &mut EffectSlots,
    feedback: &mpsc::UnboundedSender<Envelope<A>>,
    pending: &Arc<Pending>,
) {
    while let Some(effect) = chain.pop_front() {
        match effect {
            Effect::Concat(effects) => {
                for effect in effects.into_iter().rev() {
                    chain.push_front(effect);
                }
            }
            Effect::Future(FutureEffect { id, future }) => {
                pending.add();
                let feedback = feedback.clone();
                let guard = PendingGuard(Arc::clone(pending));
                match id {
                    Some(id) => {
                        let epoch = slots.allocate_epoch();
                        let task_id = id.clone();
                        let handle = tokio::spawn(async move {
                            let guard = guard;
                            if let Some(action) = future.await {
                                guard.0.add();
                                let _ = feedback.send(Envelope::Feedback {
                                    action,
                                    id: task_id,
                                    epoch,
                                });
                            }
                            if !chain.is_empty() {
                                guard.0.add();
                                let _ = feedback.send(Envelope::Resume(chain));
                            }
                        });
                        slots.register(id, epoch, handle.abort_handle());
                    }
                    None => {
                        tokio::spawn(async move {
                            let guard = guard;
                            if let Some(action) = future.await {
                                guard.0.add();
                                let _ = feedback.send(Envelope::Action(action));
                            }
                            if !chain.is_empty() {
                                guard.0.add();
                                let _ = feedback.send(Envelope::Resume(chain));
                            }
                        });
                    }
                }
                return;
            }
            other => run_effect(other, slots, feedback, pending),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct CounterState {
        count: i32,
    }

    #[derive(Debug, Clone)]
    enum CounterAction {
        Increment,
        IncrementLater,
        IncrementTwiceViaSequence,
    }

    fn counter_reducer() -> Reducer<CounterState, CounterAction, ()> {
        Reducer::new(|state: &mut CounterState, action, _| match action {
            CounterAction::Increment => {
                state.count += 1;
                Effect::none()
            }
            CounterAction::IncrementLater => {
                Effect::future(async { Some(CounterAction::Increment) })
            }
            CounterAction::IncrementTwiceViaSequence => {
                Effect::sequence([CounterAction::Increment, CounterAction::Increment])
            }
        })
    }

    #[tokio::test]
    async fn send_applies_action_and_publishes_state() {
        let store = Store::new(CounterState::default(), counter_reducer(), ());
        store.send(CounterAction::Increment);
        store.until_idle().await;
        assert_eq!(store.state().count, 1);
    }

    #[tokio::test]
    async fn effect_feedback_reenters_pipeline() {
        let store = Store::new(CounterState::default(), counter_reducer(), ());
        store.send(CounterAction::IncrementLater);
        store.until_idle().await;
        assert_eq!(store.state().count, 1);
    }

    #[tokio::test]
    async fn sequence_applies_in_produced_order() {
        let store = Store::new(CounterState::default(), counter_reducer(), ());
        store.send(CounterAction::IncrementTwiceViaSequence);
        store.until_idle().await;
        assert_eq!(store.state().count, 2);
    }

    #[tokio::test]
    async fn subscriber_sees_state_after_reduction() {
        let store = Store::new(CounterState::default(), counter_reducer(), ());
        let mut updates = store.subscribe();
        store.send(CounterAction::Increment);
        updates.changed().await.expect("store alive");
        assert_eq!(updates.borrow().count, 1);
    }

    #[tokio::test]
    async fn until_idle_returns_immediately_when_idle() {
        let store = Store::new(CounterState::default(), counter_reducer(), ());
        store.until_idle().await;
        assert_eq!(store.state().count, 0);
    }

    #[tokio::test]
    async fn chained_actions_wait_for_async_work() {
        use std::sync::atomic::AtomicBool;
        use std::time::Duration;

        #[derive(Debug, Clone, Default, PartialEq)]
        struct Probe {
            write_was_done: bool,
        }

        #[derive(Debug, Clone)]
        enum ProbeAction {
            Kick,
            Read,
        }

        let reducer = Reducer::<Probe, ProbeAction, Arc<AtomicBool>>::new(
            |state, action, env| match action {
                ProbeAction::Kick => {
                    let flag = Arc::clone(env);
                    Effect::fire_and_forget(async move {
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        flag.store(true, Ordering::SeqCst);
                    })
                    .append(Effect::action(ProbeAction::Read))
                }
                ProbeAction::Read => {
                    state.write_was_done = env.load(Ordering::SeqCst);
                    Effect::none()
                }
            },
        );

        let store = Store::new(Probe::default(), reducer, Arc::new(AtomicBool::new(false)));
        store.send(ProbeAction::Kick);
        store.until_idle().await;
        assert!(store.state().write_was_done);
    }
}
