// src/crawl/queue.rs
// =============================================================================
// The job queue shared by every worker.
//
// How it works:
// 1. push() tries the bounded channel without waiting
// 2. If the channel is full the job goes to an unbounded overflow buffer
// 3. pop() drains the overflow buffer first, then waits on the channel
// 4. close() drops the only sender; pop() returns None once both are empty
//
// A producer never blocks and never recurses, and the overflow is worked
// off by the same workers that read the channel.
//
// `pending` counts jobs that have been pushed but not yet handed to a
// worker. Workers call mark_taken() only after they count themselves as
// active, so "active + pending" never reads zero while a job is in hand.
// =============================================================================

use crossbeam_queue::SegQueue;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc::{self, error::TrySendError};
use url::Url;

// A unit of work: one URL at a given distance from the seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub url: Url,
    pub depth: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pushed {
    Queued,
    Overflowed,
    Closed,
}

#[derive(Debug)]
pub struct JobQueue {
    sender: Mutex<Option<mpsc::Sender<Job>>>,
    receiver: tokio::sync::Mutex<mpsc::Receiver<Job>>,
    overflow: SegQueue<Job>,
    pending: AtomicUsize,
}

impl JobQueue {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity);
        Self {
            sender: Mutex::new(Some(sender)),
            receiver: tokio::sync::Mutex::new(receiver),
            overflow: SegQueue::new(),
            pending: AtomicUsize::new(0),
        }
    }

    // Never waits. Jobs pushed after close() are dropped.
    pub fn push(&self, job: Job) -> Pushed {
        let guard = self.sender.lock();
        let Some(sender) = guard.as_ref() else {
            return Pushed::Closed;
        };

        // Count first so the job is never in the channel uncounted
        self.pending.fetch_add(1, Ordering::SeqCst);
        match sender.try_send(job) {
            Ok(()) => Pushed::Queued,
            Err(TrySendError::Full(job)) => {
                self.overflow.push(job);
                Pushed::Overflowed
            }
            Err(TrySendError::Closed(_)) => {
                self.pending.fetch_sub(1, Ordering::SeqCst);
                Pushed::Closed
            }
        }
    }

    // Next job, or None once the queue is closed and fully drained.
    pub async fn pop(&self) -> Option<Job> {
        if let Some(job) = self.overflow.pop() {
            return Some(job);
        }
        let mut receiver = self.receiver.lock().await;
        // Another worker may have spilled while we waited for the lock
        if let Some(job) = self.overflow.pop() {
            return Some(job);
        }
        match receiver.recv().await {
            Some(job) => Some(job),
            None => self.overflow.pop(),
        }
    }

    pub fn mark_taken(&self) {
        self.pending.fetch_sub(1, Ordering::SeqCst);
    }

    // Jobs waiting in the channel plus jobs parked in the overflow buffer
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn close(&self) {
        self.sender.lock().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(path: &str, depth: usize) -> Job {
        Job {
            url: Url::parse("https://example.com").unwrap().join(path).unwrap(),
            depth,
        }
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let queue = JobQueue::new(4);
        assert_eq!(queue.push(job("/a", 1)), Pushed::Queued);
        assert_eq!(queue.push(job("/b", 1)), Pushed::Queued);
        assert_eq!(queue.pending(), 2);

        assert_eq!(queue.pop().await, Some(job("/a", 1)));
        queue.mark_taken();
        assert_eq!(queue.pop().await, Some(job("/b", 1)));
        queue.mark_taken();
        assert_eq!(queue.pending(), 0);
    }

    #[tokio::test]
    async fn test_full_queue_spills_without_blocking() {
        let queue = JobQueue::new(1);
        assert_eq!(queue.push(job("/a", 1)), Pushed::Queued);
        assert_eq!(queue.push(job("/b", 1)), Pushed::Overflowed);
        assert_eq!(queue.push(job("/c", 1)), Pushed::Overflowed);
        assert_eq!(queue.pending(), 3);

        // Overflow is served first
        let mut seen = Vec::new();
        for _ in 0..3 {
            let next = queue.pop().await.unwrap();
            queue.mark_taken();
            seen.push(next.url.path().to_string());
        }
        assert_eq!(seen, vec!["/b", "/c", "/a"]);
        assert_eq!(queue.pending(), 0);
    }

    #[tokio::test]
    async fn test_close_drains_then_ends() {
        let queue = JobQueue::new(2);
        queue.push(job("/a", 1));
        queue.close();

        assert_eq!(queue.push(job("/late", 1)), Pushed::Closed);
        assert_eq!(queue.pop().await, Some(job("/a", 1)));
        queue.mark_taken();
        assert_eq!(queue.pop().await, None);
        assert_eq!(queue.pending(), 0);
    }

    #[tokio::test]
    async fn test_close_wakes_waiting_consumer() {
        let queue = std::sync::Arc::new(JobQueue::new(2));
        let waiter = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.pop().await })
        };
        tokio::task::yield_now().await;
        queue.close();
        assert_eq!(waiter.await.unwrap(), None);
    }
}
