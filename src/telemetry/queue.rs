//! Generic bounded queue — the per-tier building block.
//!
//! A fixed-capacity ring (`heapless::Deque`) behind a `Mutex`/`Condvar`
//! pair.  Capacity is a hard ceiling: `try_send` never blocks and never
//! grows the ring.  Multiple producers may push concurrently; the single
//! consumer may either poll (`try_recv`) or wait with a bounded timeout
//! (`recv_timeout`).
//!
//! This is deliberately independent of any RTOS queue primitive so the
//! whole pipeline runs identically under host tests and on the device.

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use heapless::Deque;

/// Bounded multi-producer queue with a timed single-consumer wait.
pub struct BoundedQueue<T, const N: usize> {
    ring: Mutex<Deque<T, N>>,
    not_empty: Condvar,
}

impl<T, const N: usize> BoundedQueue<T, N> {
    pub const fn new() -> Self {
        Self {
            ring: Mutex::new(Deque::new()),
            not_empty: Condvar::new(),
        }
    }

    /// Non-blocking enqueue.  Returns the item back if the ring is full so
    /// the caller can account for the drop without a copy having happened.
    pub fn try_send(&self, item: T) -> Result<(), T> {
        let mut ring = self.ring.lock().unwrap_or_else(PoisonError::into_inner);
        ring.push_back(item)?;
        drop(ring);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Non-blocking dequeue.
    pub fn try_recv(&self) -> Option<T> {
        self.ring
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    /// Dequeue, waiting up to `timeout` for an item to arrive.
    ///
    /// The timeout is advisory — it bounds the consumer's idle latency and
    /// carries no side effects on expiry.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut ring = self.ring.lock().unwrap_or_else(PoisonError::into_inner);

        loop {
            if let Some(item) = ring.pop_front() {
                return Some(item);
            }

            let now = Instant::now();
            if now >= deadline {
                return None;
            }

            let (guard, wait) = self
                .not_empty
                .wait_timeout(ring, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            ring = guard;

            if wait.timed_out() {
                // One final pop covers an item that raced the timeout.
                return ring.pop_front();
            }
        }
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.ring
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hard capacity ceiling.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Drop every queued item unconditionally.
    pub fn clear(&self) {
        self.ring
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn fifo_order_preserved() {
        let q: BoundedQueue<u32, 8> = BoundedQueue::new();
        for i in 0..5 {
            q.try_send(i).unwrap();
        }
        for i in 0..5 {
            assert_eq!(q.try_recv(), Some(i));
        }
        assert_eq!(q.try_recv(), None);
    }

    #[test]
    fn full_ring_rejects_without_blocking() {
        let q: BoundedQueue<u8, 4> = BoundedQueue::new();
        for i in 0..4 {
            assert!(q.try_send(i).is_ok());
        }
        assert_eq!(q.try_send(99), Err(99));
        assert_eq!(q.len(), 4);
    }

    #[test]
    fn recv_timeout_expires_empty() {
        let q: BoundedQueue<u8, 4> = BoundedQueue::new();
        let start = Instant::now();
        assert_eq!(q.recv_timeout(Duration::from_millis(20)), None);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn recv_timeout_wakes_on_send() {
        let q: Arc<BoundedQueue<u8, 4>> = Arc::new(BoundedQueue::new());
        let producer = Arc::clone(&q);

        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(10));
            producer.try_send(42).unwrap();
        });

        assert_eq!(q.recv_timeout(Duration::from_millis(500)), Some(42));
        handle.join().unwrap();
    }

    #[test]
    fn clear_empties_ring() {
        let q: BoundedQueue<u8, 4> = BoundedQueue::new();
        q.try_send(1).unwrap();
        q.try_send(2).unwrap();
        q.clear();
        assert!(q.is_empty());
        assert_eq!(q.try_recv(), None);
    }

    #[test]
    fn concurrent_producers_never_exceed_capacity() {
        let q: Arc<BoundedQueue<u32, 16>> = Arc::new(BoundedQueue::new());
        let mut handles = Vec::new();

        for t in 0..4 {
            let q = Arc::clone(&q);
            handles.push(std::thread::spawn(move || {
                for i in 0..100 {
                    let _ = q.try_send(t * 1000 + i);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert!(q.len() <= q.capacity());
    }
}
