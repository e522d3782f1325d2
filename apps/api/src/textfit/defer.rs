//! Deferred-task primitives: run a closure once, at the host's next quiet point.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

pub type Task = Box<dyn FnOnce()>;

/// Schedules a task to run once, after the current call stack unwinds.
///
/// Implementations must never run the task synchronously inside `defer`.
pub trait Deferrer {
    fn defer(&self, task: Task);
}

// ────────────────────────────────────────────────────────────────────────────
// MicrotaskQueue
// ────────────────────────────────────────────────────────────────────────────

/// FIFO queue drained explicitly by the host loop (`run_until_idle`).
#[derive(Clone, Default)]
pub struct MicrotaskQueue {
    tasks: Rc<RefCell<VecDeque<Task>>>,
}

impl MicrotaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Runs tasks until the queue is empty, including tasks queued by tasks.
    /// Returns how many ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            // Borrow released before the task runs so it can queue more work.
            let next = self.tasks.borrow_mut().pop_front();
            match next {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }

    /// Drops every queued task without running it.
    pub fn clear(&self) {
        self.tasks.borrow_mut().clear();
    }
}

impl Deferrer for MicrotaskQueue {
    fn defer(&self, task: Task) {
        self.tasks.borrow_mut().push_back(task);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LocalSpawner
// ────────────────────────────────────────────────────────────────────────────

/// Defers onto the current tokio `LocalSet` via `spawn_local`.
///
/// Must be used from inside `LocalSet::run_until` (or a task it drives); `spawn_local`
/// panics elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSpawner;

impl Deferrer for LocalSpawner {
    fn defer(&self, task: Task) {
        tokio::task::spawn_local(async move { task() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_defer_does_not_run_synchronously() {
        let queue = MicrotaskQueue::new();
        let ran = Rc::new(Cell::new(false));
        let r = Rc::clone(&ran);
        queue.defer(Box::new(move || r.set(true)));
        assert!(!ran.get());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.run_until_idle(), 1);
        assert!(ran.get());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_tasks_run_in_fifo_order() {
        let queue = MicrotaskQueue::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let o = Rc::clone(&order);
            queue.defer(Box::new(move || o.borrow_mut().push(i)));
        }
        queue.run_until_idle();
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_tasks_queued_by_tasks_are_drained() {
        let queue = MicrotaskQueue::new();
        let hits = Rc::new(Cell::new(0));
        let q = queue.clone();
        let h = Rc::clone(&hits);
        queue.defer(Box::new(move || {
            h.set(h.get() + 1);
            let h2 = Rc::clone(&h);
            q.defer(Box::new(move || h2.set(h2.get() + 1)));
        }));
        assert_eq!(queue.run_until_idle(), 2);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_clear_discards_tasks() {
        let queue = MicrotaskQueue::new();
        let ran = Rc::new(Cell::new(false));
        let r = Rc::clone(&ran);
        queue.defer(Box::new(move || r.set(true)));
        queue.clear();
        assert_eq!(queue.run_until_idle(), 0);
        assert!(!ran.get());
    }

    #[tokio::test]
    async fn test_local_spawner_runs_after_caller_yields() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let ran = Rc::new(Cell::new(false));
                let r = Rc::clone(&ran);
                let (tx, rx) = tokio::sync::oneshot::channel();
                LocalSpawner.defer(Box::new(move || {
                    r.set(true);
                    let _ = tx.send(());
                }));
                assert!(!ran.get());
                rx.await.unwrap();
                assert!(ran.get());
            })
            .await;
    }
}
