//! Ambient logging scopes.
//!
//! Every logical execution path has one chain of open scopes, innermost
//! first. The head of the chain lives in a thread-local slot that
//! [`crate::flow`] swaps in and out around each poll of a task, so a task
//! sees its own scopes no matter which worker thread polls it, and tasks
//! sharing a worker never see each other's.
//!
//! The chain is shared between providers; each node records the provider
//! that opened it and a provider's [`ScopeEnricher`] only reads its own
//! nodes.

use crate::engine::Enricher;
use crate::event::{LogEvent, PropertyFactory};
use crate::host::{State, ORIGINAL_FORMAT};
use serde_json::Value;
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub(crate) type Link = Option<Arc<ScopeNode>>;

thread_local! {
    static CURRENT: RefCell<Link> = const { RefCell::new(None) };
}

static NEXT_PROVIDER_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies the provider that owns a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProviderId(u64);

impl ProviderId {
    pub(crate) fn next() -> Self {
        ProviderId(NEXT_PROVIDER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// One open scope.
#[derive(Debug)]
pub struct ScopeNode {
    owner: ProviderId,
    name: Option<String>,
    state: State,
    parent: Link,
}

impl ScopeNode {
    pub fn owner(&self) -> ProviderId {
        self.owner
    }

    /// Category name of the logger that opened the scope, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn parent(&self) -> Option<&Arc<ScopeNode>> {
        self.parent.as_ref()
    }
}

/// Head of the chain for the path currently running on this thread.
pub(crate) fn current() -> Link {
    CURRENT.try_with(|c| c.borrow().clone()).ok().flatten()
}

/// Install `link` as the head for this thread, returning the previous head.
pub(crate) fn replace(link: Link) -> Link {
    CURRENT.try_with(|c| c.replace(link)).ok().flatten()
}

/// Makes `slot` the current head until dropped; on drop the head as it
/// then stands is written back into `slot` and the previous head returns.
///
/// Restoration happens in `Drop`, so it also runs when the guarded code
/// panics.
pub(crate) struct Entered<'a> {
    slot: &'a mut Link,
    prev: Link,
}

impl<'a> Entered<'a> {
    pub(crate) fn install(slot: &'a mut Link) -> Self {
        let prev = replace(slot.take());
        Entered { slot, prev }
    }
}

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        *self.slot = replace(self.prev.take());
    }
}

/// Closes its scope when dropped.
///
/// Dropping restores the scope's parent as head of the current path.
/// Guards should be dropped in reverse order of creation. Dropping one out
/// of order leaves the path at the dropped scope's parent; dropping one
/// whose scope is not on the current chain (already unwound, or moved to
/// another thread) changes nothing.
#[must_use = "the scope closes as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ScopeGuard {
    node: Arc<ScopeNode>,
}

impl ScopeGuard {
    pub(crate) fn push(owner: ProviderId, name: Option<String>, state: State) -> Self {
        let node = Arc::new(ScopeNode {
            owner,
            name,
            state,
            parent: current(),
        });
        replace(Some(Arc::clone(&node)));
        ScopeGuard { node }
    }

    pub fn node(&self) -> &ScopeNode {
        &self.node
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if is_on_chain(&current(), &self.node) {
            replace(self.node.parent.clone());
        }
    }
}

fn is_on_chain(head: &Link, node: &Arc<ScopeNode>) -> bool {
    let mut cursor = head.as_ref();
    while let Some(n) = cursor {
        if Arc::ptr_eq(n, node) {
            return true;
        }
        cursor = n.parent.as_ref();
    }
    false
}

/// The chain as it stood when captured, for handing to another thread.
///
/// Scopes opened inside [`enter`](Self::enter) belong to that call only;
/// they are never visible to the capturing path.
#[derive(Debug, Clone, Default)]
pub struct ScopeSnapshot {
    pub(crate) head: Link,
}

impl ScopeSnapshot {
    pub fn capture() -> Self {
        Self { head: current() }
    }

    /// Run `f` with this snapshot as the current chain.
    pub fn enter<R>(&self, f: impl FnOnce() -> R) -> R {
        let mut head = self.head.clone();
        let _entered = Entered::install(&mut head);
        f()
    }

    /// Number of open scopes, across all providers.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut node = self.head.as_deref();
        while let Some(n) = node {
            depth += 1;
            node = n.parent.as_deref();
        }
        depth
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

/// Contributes the properties of a provider's open scopes to each event.
///
/// Walks innermost to outermost and only adds properties the event does not
/// already have, so inner scopes shadow outer ones and message properties
/// shadow both. String `{OriginalFormat}` entries are skipped; every other
/// key is attached verbatim with default capture.
#[derive(Debug, Clone, Copy)]
pub struct ScopeEnricher {
    owner: ProviderId,
}

impl ScopeEnricher {
    pub fn new(owner: ProviderId) -> Self {
        Self { owner }
    }
}

impl Enricher for ScopeEnricher {
    fn enrich(&self, event: &mut LogEvent, factory: &dyn PropertyFactory) {
        let head = current();
        let mut node = head.as_deref();
        while let Some(scope) = node {
            if scope.owner == self.owner {
                if let State::Structured(state) = &scope.state {
                    for (key, value) in state.pairs() {
                        if key == ORIGINAL_FORMAT && matches!(value, Value::String(_)) {
                            continue;
                        }
                        event.add_property_if_absent(factory.create_property(key, value, false));
                    }
                }
            }
            node = scope.parent.as_deref();
        }
    }
}
