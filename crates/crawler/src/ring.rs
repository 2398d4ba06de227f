//! The handoff ring: bounded-concurrency fan-out with in-order commits.
//!
//! Workers enqueued into a [`Ring`] run concurrently, but each one holds a
//! [`Handoff`] wired to its neighbours: a rendezvous with the predecessor
//! that blocks until the predecessor has finished its ordered work, and one
//! with the successor that releases it in turn. Whatever a worker does
//! between [`Handoff::recv`] and [`Handoff::send`] therefore executes in
//! exact enqueue order, while everything outside that section overlaps
//! freely.
//!
//! The representation is a linear chain of single-shot channels, one
//! rendezvous per enqueued item. Tokens are opaque to the ring; the crawlers
//! pass heights through them, the aggregation jobs thread running state.

use std::{fmt, future::Future};
use tokio::{sync::oneshot, task::JoinSet};
use tracing::{debug, warn};

/// A worker's two ring endpoints.
#[derive(Debug)]
pub struct Handoff<T> {
    rx: Option<oneshot::Receiver<T>>,
    tx: Option<oneshot::Sender<T>>,
}

impl<T> Handoff<T> {
    /// Waits for the predecessor's token, entering the ordered section.
    ///
    /// `None` means the predecessor died without sending. The ring is
    /// already degraded at that point; callers log and carry on so the
    /// chain keeps moving.
    pub async fn recv(&mut self) -> Option<T> {
        match self.rx.take() {
            Some(rx) => rx.await.ok(),
            None => None,
        }
    }

    /// Hands `token` to the successor, leaving the ordered section.
    ///
    /// Workers must send on every path; a missing send stalls nothing but
    /// surfaces as a degraded `recv` downstream.
    pub fn send(&mut self, token: T) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(token);
        }
    }
}

/// A chain of [`Handoff`]s plus the wait-group that bounds how many workers
/// are in flight.
#[derive(Debug)]
pub struct Ring<T> {
    tail: oneshot::Receiver<T>,
    tasks: JoinSet<()>,
    dispatched: usize,
}

impl<T: Send + 'static> Ring<T> {
    /// A ring whose first worker will receive `seed`.
    pub fn new(seed: T) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(seed);
        Self { tail: rx, tasks: JoinSet::new(), dispatched: 0 }
    }

    /// Spawns `work` as the next link of the chain.
    pub fn enqueue<F, Fut>(&mut self, work: F)
    where
        F: FnOnce(Handoff<T>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let prev = std::mem::replace(&mut self.tail, rx);
        self.tasks.spawn(work(Handoff { rx: Some(prev), tx: Some(tx) }));
        self.dispatched += 1;
    }

    /// Wait-group barrier: once `max` workers have been dispatched since the
    /// last barrier, waits for all of them to finish.
    pub async fn throttle(&mut self, max: usize) {
        if max > 0 && self.dispatched >= max {
            while self.tasks.join_next().await.is_some() {}
            self.dispatched = 0;
        }
    }

    /// Drains the ring: waits for every worker, then receives the final
    /// token and checks it against `sentinel`.
    ///
    /// A mismatch is logged, never fatal; a reorg shifts the token sequence
    /// by design. Returns the final token, if one arrived.
    pub async fn close_after(self, sentinel: T) -> Option<T>
    where
        T: PartialEq + fmt::Debug,
    {
        let token = self.drain().await;
        if let Some(token) = &token {
            if *token != sentinel {
                debug!(?token, ?sentinel, "ring drained on an unexpected token");
            }
        }
        token
    }

    /// Drains the ring without a sentinel check; the stateful aggregation
    /// jobs cannot predict their final token.
    pub async fn drain(mut self) -> Option<T> {
        while self.tasks.join_next().await.is_some() {}
        match self.tail.await {
            Ok(token) => Some(token),
            Err(_) => {
                warn!("ring drained without a final token");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::{sync::Arc, time::Duration};

    /// Commits land in enqueue order no matter how the fetch phases
    /// interleave.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn commits_follow_enqueue_order() {
        for max_in_flight in [1usize, 3, 10] {
            let heights: Vec<u64> = (0..40u64).map(|i| 100 - i).collect();
            let commits = Arc::new(Mutex::new(Vec::new()));

            let mut ring = Ring::new(heights[0]);
            for &height in &heights {
                let commits = commits.clone();
                ring.enqueue(move |mut handoff| async move {
                    // unordered phase of pseudo-random length
                    tokio::time::sleep(Duration::from_micros((height % 7) * 300)).await;
                    let _ = handoff.recv().await;
                    commits.lock().push(height);
                    handoff.send(height - 1);
                });
                ring.throttle(max_in_flight).await;
            }
            let last = heights[heights.len() - 1];
            let token = ring.close_after(last - 1).await;

            assert_eq!(*commits.lock(), heights);
            assert_eq!(token, Some(last - 1));
        }
    }

    /// The seed token reaches the first worker.
    #[tokio::test]
    async fn seed_is_delivered() {
        let mut ring = Ring::new(7u64);
        let seen = Arc::new(Mutex::new(None));
        let into = seen.clone();
        ring.enqueue(move |mut handoff| async move {
            *into.lock() = handoff.recv().await;
            handoff.send(8);
        });
        ring.close_after(8).await;
        assert_eq!(*seen.lock(), Some(7));
    }

    /// An empty ring drains on its seed.
    #[tokio::test]
    async fn empty_ring_drains_on_seed() {
        let ring = Ring::new(42u64);
        assert_eq!(ring.close_after(42).await, Some(42));
    }

    /// A worker that forgets to send degrades the chain without stalling it.
    #[tokio::test]
    async fn missing_send_does_not_deadlock() {
        let mut ring = Ring::new(0u64);
        ring.enqueue(|mut handoff| async move {
            let _ = handoff.recv().await;
            // no send
        });
        let received = Arc::new(Mutex::new(Some(99u64)));
        let into = received.clone();
        ring.enqueue(move |mut handoff| async move {
            *into.lock() = handoff.recv().await;
            handoff.send(2);
        });
        assert_eq!(ring.close_after(2).await, Some(2));
        assert_eq!(*received.lock(), None);
    }

    /// For any pipeline length and in-flight bound, the commit order equals
    /// the enqueue order.
    #[test]
    fn ordered_commit_holds_for_any_bounds() {
        use proptest::prelude::*;

        proptest!(ProptestConfig::with_cases(16), |(count in 1usize..50, max in 1usize..16)| {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_time()
                .build()
                .expect("runtime");
            let commits = Arc::new(Mutex::new(Vec::new()));
            let observed = runtime.block_on(async {
                let mut ring = Ring::new(0u64);
                for i in 0..count as u64 {
                    let commits = commits.clone();
                    ring.enqueue(move |mut handoff| async move {
                        tokio::time::sleep(Duration::from_micros((i % 5) * 200)).await;
                        let _ = handoff.recv().await;
                        commits.lock().push(i);
                        handoff.send(i + 1);
                    });
                    ring.throttle(max).await;
                }
                ring.close_after(count as u64).await
            });
            prop_assert_eq!(observed, Some(count as u64));
            let expected: Vec<u64> = (0..count as u64).collect();
            prop_assert_eq!(&*commits.lock(), &expected);
        });
    }

    /// Tokens can carry arbitrary running state, not just heights.
    #[tokio::test]
    async fn tokens_thread_state() {
        let mut ring: Ring<Vec<u64>> = Ring::new(Vec::new());
        for i in 0..5u64 {
            ring.enqueue(move |mut handoff| async move {
                let mut acc = handoff.recv().await.unwrap_or_default();
                acc.push(i);
                handoff.send(acc);
            });
        }
        let acc = ring.close_after(vec![0, 1, 2, 3, 4]).await.unwrap();
        assert_eq!(acc, vec![0, 1, 2, 3, 4]);
    }
}
