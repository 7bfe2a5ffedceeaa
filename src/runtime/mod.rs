//! Composable state-runtime primitives.
//!
//! This module provides the building blocks for unidirectional
//! data flow: every user intent and system event enters as an action,
//! a pure reducer turns it into state mutations plus effect
//! descriptions, and the store executes those effects and feeds their
//! results back in as further actions.
//!
//! # Architecture
//!
//! ```text
//! Action ──→ Store ──→ Reducer ──→ State ──→ Subscribers
//!    ↑                    │
//!    └──── Effects ←──────┘
//! ```
//!
//! - **State**: value-semantics data owned by the store at the root
//! - **Action**: discrete unit of intent, possibly nested per feature
//! - **Reducer**: pure transition `(state, action, env) -> effect`
//! - **Effect**: cancellable description of asynchronous follow-up work
//!
//! Reducers compose: [`Reducer::combine`] sequences siblings,
//! [`Reducer::pullback`] lifts a child feature into its parent via
//! accessor pairs, and [`Reducer::with_state`] re-scopes a reducer on a
//! derived key so stale in-flight work is cancelled.

mod accessor;
mod effect;
mod reducer;
mod resource;
mod store;

pub use accessor::{ActionPrism, StateLens};
pub use effect::{Effect, EffectId};
pub use reducer::{Identified, Reducer};
pub use resource::{AsyncResource, Phase, ResourceAction};
pub use store::Store;
