//! # Blocking FIFO Queue
//!
//! A multi-producer multi-consumer queue used for the hand-offs between the main
//! thread and the chunk workers. Consumers may block in [`ConcurrentQueue::wait_and_pop`]
//! until an item arrives; [`ConcurrentQueue::stop`] releases every blocked consumer.

use std::{
    collections::VecDeque,
    sync::{Condvar, Mutex, MutexGuard},
};

#[derive(Debug)]
struct QueueState<T> {
    items: VecDeque<T>,
    stopped: bool,
}

/// Thread-safe FIFO with a stop flag.
///
/// Items pushed after [`stop`](Self::stop) are still accepted; they are returned by
/// [`try_pop`](Self::try_pop) and by `wait_and_pop` until the queue is empty.
#[derive(Debug)]
pub struct ConcurrentQueue<T> {
    state: Mutex<QueueState<T>>,
    available: Condvar,
}

impl<T> Default for ConcurrentQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ConcurrentQueue<T> {
    /// Creates an empty, running queue.
    pub fn new() -> Self {
        ConcurrentQueue {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                stopped: false,
            }),
            available: Condvar::new(),
        }
    }

    // A panic while holding the lock cannot leave the deque half-modified, so a
    // poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Appends `item` and wakes one waiting consumer.
    pub fn push(&self, item: T) {
        self.lock().items.push_back(item);
        self.available.notify_one();
    }

    /// Blocks until an item is available or the queue is stopped.
    ///
    /// Returns `None` only once the queue is stopped and empty.
    pub fn wait_and_pop(&self) -> Option<T> {
        let mut state = self.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                return Some(item);
            }
            if state.stopped {
                return None;
            }
            state = self
                .available
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Pops the front item without blocking.
    pub fn try_pop(&self) -> Option<T> {
        self.lock().items.pop_front()
    }

    /// Marks the queue stopped and wakes every waiter. Idempotent.
    pub fn stop(&self) {
        self.lock().stopped = true;
        self.available.notify_all();
    }

    /// Whether [`stop`](Self::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    /// Whether no items are queued.
    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, thread, time::Duration};

    #[test]
    fn test_fifo_order() {
        let queue = ConcurrentQueue::new();
        queue.push(1);
        queue.push(2);
        queue.push(3);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.try_pop(), Some(1));
        assert_eq!(queue.wait_and_pop(), Some(2));
        assert_eq!(queue.try_pop(), Some(3));
        assert_eq!(queue.try_pop(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_stop_releases_waiters() {
        let queue = Arc::new(ConcurrentQueue::<u32>::new());
        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || queue.wait_and_pop())
            })
            .collect();

        thread::sleep(Duration::from_millis(20));
        queue.stop();
        queue.stop();

        for waiter in waiters {
            assert_eq!(waiter.join().unwrap(), None);
        }
        assert!(queue.is_stopped());
    }

    #[test]
    fn test_push_wakes_waiter() {
        let queue = Arc::new(ConcurrentQueue::new());
        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.wait_and_pop())
        };

        thread::sleep(Duration::from_millis(10));
        queue.push("chunk");
        assert_eq!(consumer.join().unwrap(), Some("chunk"));
    }

    #[test]
    fn test_items_survive_stop() {
        let queue = ConcurrentQueue::new();
        queue.push(7);
        queue.stop();
        queue.push(8);

        assert_eq!(queue.wait_and_pop(), Some(7));
        assert_eq!(queue.try_pop(), Some(8));
        assert_eq!(queue.wait_and_pop(), None);
    }

    #[test]
    fn test_many_producers_one_consumer() {
        let queue = Arc::new(ConcurrentQueue::new());
        let producers: Vec<_> = (0..4)
            .map(|p| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    for i in 0..100 {
                        queue.push(p * 100 + i);
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }

        let mut seen: Vec<_> = std::iter::from_fn(|| queue.try_pop()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..400).collect::<Vec<_>>());
    }
}
