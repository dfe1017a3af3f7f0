//! Concurrency-bounded scheduler.
//!
//! One semaphore bounds how many task bodies execute at once. Admission is
//! FIFO: tasks are polled in submission order and the semaphore queues
//! waiters fairly. Waiting for admission, or sleeping between retries,
//! holds no slot, so nested work (directory children) shares the same
//! ceiling without deadlocking.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use futures::FutureExt;
use tokio::sync::Semaphore;
use tracing::{error, trace};

use crate::error::Panicked;

pub const DEFAULT_CONCURRENCY: usize = 10;

#[derive(Debug)]
struct Slots {
    semaphore: Semaphore,
    ceiling: usize,
    active: AtomicUsize,
    peak: AtomicUsize,
}

/// Admission point shared by every task of a run.
#[derive(Debug, Clone)]
pub struct Scheduler {
    slots: Arc<Slots>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}

impl Scheduler {
    /// A scheduler running at most `ceiling` bodies at once (at least one).
    pub fn new(ceiling: usize) -> Self {
        let ceiling = ceiling.max(1);
        Self {
            slots: Arc::new(Slots {
                semaphore: Semaphore::new(ceiling),
                ceiling,
                active: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }),
        }
    }

    pub fn ceiling(&self) -> usize {
        self.slots.ceiling
    }

    /// Bodies executing right now.
    pub fn active(&self) -> usize {
        self.slots.active.load(Ordering::SeqCst)
    }

    /// Highest number of bodies ever executing at once.
    pub fn peak(&self) -> usize {
        self.slots.peak.load(Ordering::SeqCst)
    }

    /// Wait for a slot, then run `body` while holding it.
    pub async fn admit<F: Future>(&self, body: F) -> F::Output {
        // The semaphore is never closed, so acquisition only waits.
        let _permit = self.slots.semaphore.acquire().await.ok();
        let _active = ActiveGuard::enter(&self.slots);
        body.await
    }

    /// Run tasks that admit themselves, returning outputs in submission
    /// order once every task has settled. A panicking task yields `Err`
    /// without disturbing the others.
    pub async fn gather<I, F>(&self, tasks: I) -> Vec<Result<F::Output, Panicked>>
    where
        I: IntoIterator<Item = F>,
        F: Future,
    {
        join_all(tasks.into_iter().map(|task| async move {
            AssertUnwindSafe(task).catch_unwind().await.map_err(|payload| {
                let panicked = Panicked::from_payload(payload);
                error!(error = %panicked, "task panicked");
                panicked
            })
        }))
        .await
    }

    /// Admit each body as a whole and gather the results in order.
    pub async fn run_all<I, F>(&self, bodies: I) -> Vec<Result<F::Output, Panicked>>
    where
        I: IntoIterator<Item = F>,
        F: Future,
    {
        self.gather(bodies.into_iter().map(|body| self.admit(body)))
            .await
    }
}

struct ActiveGuard<'a> {
    slots: &'a Slots,
}

impl<'a> ActiveGuard<'a> {
    fn enter(slots: &'a Slots) -> Self {
        let active = slots.active.fetch_add(1, Ordering::SeqCst) + 1;
        slots.peak.fetch_max(active, Ordering::SeqCst);
        trace!(active, ceiling = slots.ceiling, "task admitted");
        Self { slots }
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.slots.active.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_never_exceeds_ceiling() {
        for ceiling in [1, 2, 3, 7] {
            let scheduler = Scheduler::new(ceiling);
            let bodies = (0..20u64).map(|i| async move {
                tokio::time::sleep(Duration::from_millis(10 + (i % 4) * 5)).await;
                i
            });

            let results = scheduler.run_all(bodies).await;

            let values: Vec<u64> = results.into_iter().map(|r| r.unwrap()).collect();
            assert_eq!(values, (0..20).collect::<Vec<_>>());
            assert_eq!(scheduler.peak(), ceiling);
            assert_eq!(scheduler.active(), 0);
        }
    }

    #[tokio::test]
    async fn test_admission_is_fifo() {
        let scheduler = Scheduler::new(1);
        let order = Mutex::new(Vec::new());

        let bodies = (0..6).map(|i| {
            let order = &order;
            async move {
                order.lock().unwrap().push(i);
                tokio::task::yield_now().await;
            }
        });
        scheduler.run_all(bodies).await;

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_panic_is_isolated() {
        let scheduler = Scheduler::new(2);
        let bodies = (0..3).map(|i| async move {
            if i == 1 {
                panic!("task {} failed hard", i);
            }
            i
        });

        let results = scheduler.run_all(bodies).await;

        assert_eq!(results[0].as_ref().ok(), Some(&0));
        assert_eq!(results[1].as_ref().unwrap_err().message, "task 1 failed hard");
        assert_eq!(results[2].as_ref().ok(), Some(&2));
        assert_eq!(scheduler.active(), 0);
    }

    #[tokio::test]
    async fn test_zero_ceiling_rounds_up() {
        assert_eq!(Scheduler::new(0).ceiling(), 1);
        assert_eq!(Scheduler::default().ceiling(), 10);
    }
}
