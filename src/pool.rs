//! Fixed-size worker pool fed by a bounded queue.
//!
//! `size` long-lived worker tasks share one receiving end of a bounded
//! channel. Each worker takes one job at a time and runs it to completion
//! before taking the next, so at most `size` jobs run concurrently and at
//! most `queue_depth` more wait in the queue.
//!
//! ```text
//! submit ──► [ bounded queue ] ──► worker 0 ─┐
//!                              ├─► worker 1  ├─► handler(job)
//!                              └─► worker N ─┘
//! ```
//!
//! A job that panics is contained in its own task; the worker reports it and
//! keeps going.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::error::Error;

pub struct WorkerPool<T> {
    sender: mpsc::Sender<T>,
    workers: Vec<JoinHandle<()>>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Spawns `size` workers that run `handler` on every submitted job.
    ///
    /// Must be called from within a tokio runtime. `size` and `queue_depth`
    /// are clamped to at least 1.
    pub fn start<F, Fut>(size: usize, queue_depth: usize, handler: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel(queue_depth.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let handler = Arc::new(handler);

        let size = size.max(1);
        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            let receiver = Arc::clone(&receiver);
            let handler = Arc::clone(&handler);
            workers.push(tokio::spawn(async move {
                loop {
                    // The lock is released as soon as a job (or the close) arrives.
                    let job = receiver.lock().await.recv().await;
                    let Some(job) = job else { break };
                    if let Err(e) = tokio::spawn((*handler)(job)).await {
                        error!(worker = id, "job failed: {e}");
                    }
                }
                debug!(worker = id, "worker stopped");
            }));
        }

        Self { sender, workers }
    }

    /// Number of live worker tasks.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Waits for a free queue slot. Sending through the returned permit
    /// cannot fail.
    pub async fn reserve(&self) -> Result<mpsc::Permit<'_, T>, Error> {
        self.sender.reserve().await.map_err(|_| Error::PoolClosed)
    }

    /// Queues one job, waiting while the queue is full.
    pub async fn submit(&self, job: T) -> Result<(), Error> {
        self.sender.send(job).await.map_err(|_| Error::PoolClosed)
    }

    /// Stops taking new work and waits for the workers to finish what is
    /// already queued or running.
    ///
    /// With a `grace` period, workers still busy when it expires are
    /// abandoned: their connection tasks keep running detached until the
    /// runtime shuts down.
    pub async fn shutdown(self, grace: Option<Duration>) {
        let Self { sender, mut workers } = self;
        drop(sender);

        let drain = async {
            for worker in workers.iter_mut() {
                if let Err(e) = worker.await {
                    error!("worker exited abnormally: {e}");
                }
            }
        };
        match grace {
            None => drain.await,
            Some(grace) => {
                if tokio::time::timeout(grace, drain).await.is_err() {
                    let busy = workers.iter().filter(|w| !w.is_finished()).count();
                    warn!(busy, "grace period elapsed, abandoning in-flight work");
                    for worker in &workers {
                        worker.abort();
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::oneshot;

    use super::*;

    #[tokio::test]
    async fn runs_every_submitted_job() {
        let done = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&done);
        let pool = WorkerPool::start(4, 4, move |n: usize| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(n, Ordering::SeqCst);
            }
        });
        assert_eq!(pool.size(), 4);

        for n in 1..=100 {
            pool.submit(n).await.unwrap();
        }
        pool.shutdown(None).await;

        assert_eq!(done.load(Ordering::SeqCst), 5050);
    }

    #[tokio::test]
    async fn concurrency_is_bounded_by_pool_size() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (r, p) = (Arc::clone(&running), Arc::clone(&peak));
        let pool = WorkerPool::start(3, 16, move |_: ()| {
            let (running, peak) = (Arc::clone(&r), Arc::clone(&p));
            async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            }
        });

        for _ in 0..12 {
            pool.submit(()).await.unwrap();
        }
        pool.shutdown(None).await;

        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert!(peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn panicking_job_does_not_kill_worker() {
        let done = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&done);
        let pool = WorkerPool::start(1, 4, move |fail: bool| {
            let counter = Arc::clone(&counter);
            async move {
                assert!(!fail, "job asked to fail");
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        pool.submit(true).await.unwrap();
        pool.submit(false).await.unwrap();
        pool.shutdown(None).await;

        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn reserve_then_send() {
        let (tx, rx) = oneshot::channel();
        let tx = Arc::new(std::sync::Mutex::new(Some(tx)));
        let pool = WorkerPool::start(1, 1, move |v: u32| {
            let tx = Arc::clone(&tx);
            async move {
                if let Some(tx) = tx.lock().unwrap().take() {
                    let _ = tx.send(v);
                }
            }
        });

        pool.reserve().await.unwrap().send(7);
        assert_eq!(rx.await.unwrap(), 7);
        pool.shutdown(None).await;
    }

    #[tokio::test]
    async fn grace_period_abandons_stuck_work() {
        let pool = WorkerPool::start(1, 1, |_: ()| std::future::pending::<()>());
        pool.submit(()).await.unwrap();

        tokio::time::timeout(Duration::from_secs(5), pool.shutdown(Some(Duration::from_millis(20))))
            .await
            .expect("shutdown should return once the grace period elapses");
    }
}
