//! Accessor pairs used by reducer composition.
//!
//! A [`StateLens`] projects a parent state onto one of its substates,
//! a [`ActionPrism`] embeds/extracts one variant of a parent action.
//! Passing these as plain values lets a child reducer be lifted into a
//! parent domain without either side knowing the other's full type.

use std::sync::Arc;

/// Mutable projection from a parent state onto a child substate.
///
/// The projection returns `None` when the child is currently absent
/// (a dismissed sheet, a not-presented screen). Composition treats an
/// absent child as "skip entirely".
pub struct StateLens<P, C> {
    project: Arc<dyn Fn(&mut P) -> Option<&mut C> + Send + Sync>,
}

impl<P, C> StateLens<P, C> {
    pub fn new(project: impl Fn(&mut P) -> Option<&mut C> + Send + Sync + 'static) -> Self {
        Self {
            project: Arc::new(project),
        }
    }

    pub fn project<'a>(&self, parent: &'a mut P) -> Option<&'a mut C> {
        (self.project)(parent)
    }
}

impl<P, C> Clone for StateLens<P, C> {
    fn clone(&self) -> Self {
        Self {
            project: Arc::clone(&self.project),
        }
    }
}

/// Embed/extract pair for one variant of a parent action type.
///
/// `extract` decodes a parent action into the child's action type,
/// returning `None` for every other variant; `embed` wraps a child
/// action back up so effects produced by the child can re-enter the
/// parent's pipeline.
pub struct ActionPrism<P, C> {
    extract: Arc<dyn Fn(&P) -> Option<C> + Send + Sync>,
    embed: Arc<dyn Fn(C) -> P + Send + Sync>,
}

impl<P, C> ActionPrism<P, C> {
    pub fn new(
        extract: impl Fn(&P) -> Option<C> + Send + Sync + 'static,
        embed: impl Fn(C) -> P + Send + Sync + 'static,
    ) -> Self {
        Self {
            extract: Arc::new(extract),
            embed: Arc::new(embed),
        }
    }

    pub fn extract(&self, parent: &P) -> Option<C> {
        (self.extract)(parent)
    }

    pub fn embed(&self, child: C) -> P {
        (self.embed)(child)
    }

    pub(crate) fn embedder(&self) -> Arc<dyn Fn(C) -> P + Send + Sync> {
        Arc::clone(&self.embed)
    }
}

impl<P, C> Clone for ActionPrism<P, C> {
    fn clone(&self) -> Self {
        Self {
            extract: Arc::clone(&self.extract),
            embed: Arc::clone(&self.embed),
        }
    }
}
