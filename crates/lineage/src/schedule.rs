//! Single-threaded deferred task queue
//!
//! Work that must run after a constructor returns (deferred `constructed`
//! hooks, replay of initial values) is queued here, one FIFO per thread.
//! Nothing runs until the owner of the thread drives the queue with
//! [`run_pending`]; a task once queued always runs to completion.

use std::cell::RefCell;
use std::collections::VecDeque;

type Task = Box<dyn FnOnce()>;

thread_local! {
    static QUEUE: RefCell<VecDeque<Task>> = const { RefCell::new(VecDeque::new()) };
}

/// Queue `task` for the next deferred turn of this thread
pub fn defer<F>(task: F)
where
    F: FnOnce() + 'static,
{
    QUEUE.with_borrow_mut(|queue| queue.push_back(Box::new(task)));
}

/// Number of queued tasks on this thread
pub fn pending() -> usize {
    QUEUE.with_borrow(VecDeque::len)
}

/// Run queued tasks until the queue is empty
///
/// Tasks queued while draining run in the same call, after everything that
/// was already queued. Returns the number of tasks run.
pub fn run_pending() -> usize {
    let mut ran = 0;
    while let Some(task) = QUEUE.with_borrow_mut(VecDeque::pop_front) {
        task();
        ran += 1;
    }
    if ran > 0 {
        tracing::trace!(tasks = ran, "deferred turn drained");
    }
    ran
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_fifo_and_nested_defer() {
        run_pending();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l = Rc::clone(&log);
        defer(move || {
            l.borrow_mut().push(1);
            let inner = Rc::clone(&l);
            defer(move || inner.borrow_mut().push(3));
        });
        let l = Rc::clone(&log);
        defer(move || l.borrow_mut().push(2));

        assert_eq!(pending(), 2);
        assert!(log.borrow().is_empty());
        assert_eq!(run_pending(), 3);
        assert_eq!(*log.borrow(), [1, 2, 3]);
        assert_eq!(pending(), 0);
    }

    #[test]
    fn test_empty_queue() {
        run_pending();
        assert_eq!(run_pending(), 0);
    }
}
