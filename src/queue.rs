//! Concurrent FIFO work queue with drain-completion semantics
//!
//! The pipeline's stages communicate exclusively through this queue. It is
//! unbounded, never drops an item, and tracks a pending count so callers can
//! await the moment every item ever enqueued has been marked processed.
//!
//! # Semantics
//!
//! - `put` enqueues without blocking and increments the pending count
//! - `get` awaits an item; it has no failure mode (cancellation is the
//!   caller's concern, handled at the worker loop)
//! - `mark_done` decrements the pending count, one call per dequeued item
//!   after processing
//! - `join` awaits the pending count reaching zero
//!
//! # Implementation
//!
//! A mutex guards the item list and pending count together; two `Notify`
//! handles signal item arrival and drain. Waiters register interest with
//! `notified()` *before* re-checking state, so a signal arriving between the
//! check and the await is never lost.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

struct QueueState<T> {
    items: VecDeque<T>,
    pending: usize,
}

/// Unbounded concurrent FIFO with blocking dequeue and drain-completion
///
/// Shared across tasks behind an `Arc`. The pending count covers every item
/// that has been `put` but not yet `mark_done`d, whether it is still queued
/// or currently being processed by a worker.
///
/// # Examples
///
/// ```
/// use image_grabber::WorkQueue;
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let queue = Arc::new(WorkQueue::new());
/// queue.put("job");
///
/// let worker = Arc::clone(&queue);
/// tokio::spawn(async move {
///     let item = worker.get().await;
///     assert_eq!(item, "job");
///     worker.mark_done();
/// });
///
/// // Resolves once the spawned worker calls mark_done
/// queue.join().await;
/// # }
/// ```
pub struct WorkQueue<T> {
    state: Mutex<QueueState<T>>,
    item_added: Notify,
    drained: Notify,
}

impl<T> WorkQueue<T> {
    /// Create a new, empty queue
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                pending: 0,
            }),
            item_added: Notify::new(),
            drained: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        // Recover from poisoning: queue state is a list and a counter, both
        // valid at every point a panic could occur while the lock is held
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueue an item and increment the pending count
    ///
    /// Never blocks; the queue is unbounded.
    pub fn put(&self, item: T) {
        {
            let mut state = self.lock();
            state.items.push_back(item);
            state.pending += 1;
        }
        self.item_added.notify_one();
    }

    /// Dequeue an item, waiting until one is available
    ///
    /// Does not decrement the pending count; call [`mark_done`](Self::mark_done)
    /// after the item has been processed.
    pub async fn get(&self) -> T {
        loop {
            // Register before checking so a put between the check and the
            // await still wakes us
            let notified = self.item_added.notified();
            if let Some(item) = self.lock().items.pop_front() {
                return item;
            }
            notified.await;
        }
    }

    /// Record that one previously dequeued item has been fully processed
    ///
    /// When the pending count reaches zero, all [`join`](Self::join) callers
    /// are released. Calling this more times than items were dequeued is a
    /// caller bug; the count saturates at zero and a warning is logged.
    pub fn mark_done(&self) {
        let drained = {
            let mut state = self.lock();
            if state.pending == 0 {
                tracing::warn!("mark_done called with no pending items");
                return;
            }
            state.pending -= 1;
            state.pending == 0
        };
        if drained {
            self.drained.notify_waiters();
        }
    }

    /// Wait until every item ever enqueued has been marked processed
    ///
    /// Resolves immediately if nothing is pending. Items `put` after the
    /// pending count was observed at zero are not waited for.
    pub async fn join(&self) {
        loop {
            let notified = self.drained.notified();
            if self.lock().pending == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Number of items currently queued (excluding items being processed)
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    /// Whether the queue currently holds no items
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of items enqueued but not yet marked processed
    pub fn pending(&self) -> usize {
        self.lock().pending
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
