//! Carrying the scope chain across `.await` points and spawned tasks.
//!
//! A wrapped future captures the chain head when it is wrapped (the fork
//! point), installs that head only for the duration of each poll and saves
//! whatever head it left behind for the next poll. Scopes opened inside the
//! future therefore survive suspension and thread migration, and never
//! leak to the task that happened to share the worker thread.

use crate::scope::{self, Entered, Link};
use std::future::Future;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::task::JoinHandle;

pin_project_lite::pin_project! {
    /// Future returned by [`FlowExt::in_current_scope`] and
    /// [`FlowExt::in_scope`].
    ///
    /// The wrapped future is also dropped with its own chain installed, so
    /// cancelling it (timeouts, `select!`, aborted tasks) closes its scopes
    /// on its own path and nowhere else.
    #[must_use = "futures do nothing unless polled"]
    pub struct FlowScoped<F> {
        #[pin]
        inner: Option<F>,
        head: Link,
    }

    impl<F> PinnedDrop for FlowScoped<F> {
        fn drop(this: Pin<&mut Self>) {
            let mut this = this.project();
            let _entered = Entered::install(this.head);
            this.inner.set(None);
        }
    }
}

impl<F: Future> Future for FlowScoped<F> {
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();
        let _entered = Entered::install(this.head);
        let output = match this.inner.as_mut().as_pin_mut() {
            Some(inner) => ready!(inner.poll(cx)),
            None => panic!("`FlowScoped` polled after completion"),
        };
        this.inner.set(None);
        Poll::Ready(output)
    }
}

/// Extension methods attaching a scope chain to any future.
pub trait FlowExt: Future + Sized {
    /// Run this future as a fork of the current path: it starts with the
    /// scopes open right now, and its own scope changes stay inside it.
    fn in_current_scope(self) -> FlowScoped<Self> {
        FlowScoped {
            inner: Some(self),
            head: scope::current(),
        }
    }

    /// Run this future with the chain captured in `snapshot`.
    fn in_scope(self, snapshot: &scope::ScopeSnapshot) -> FlowScoped<Self> {
        FlowScoped {
            inner: Some(self),
            head: snapshot.head.clone(),
        }
    }
}

impl<F: Future> FlowExt for F {}

/// Spawn `future` on the Tokio runtime as a fork of the current path.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(future.in_current_scope())
}
