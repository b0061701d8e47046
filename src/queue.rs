use std::{cell::RefCell, collections::VecDeque, rc::Rc};

pub type Task = Box<dyn FnOnce()>;

/// Something that runs UI work later, in submission order, on the UI thread.
pub trait Scheduler {
    fn schedule_later(&self, task: Task);
}

/// Single-threaded FIFO task queue.
///
/// Clones share the same queue. Tasks enqueued while the queue is draining run
/// in the same drain, after everything that was already pending.
#[derive(Clone, Default)]
pub struct UiQueue {
    tasks: Rc<RefCell<VecDeque<Task>>>,
}

impl UiQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Runs the oldest pending task. Returns `false` if nothing was pending.
    pub fn run_next(&self) -> bool {
        // Release the borrow before running: the task may schedule more work.
        let next = self.tasks.borrow_mut().pop_front();
        match next {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Runs tasks until the queue is empty and returns how many ran.
    pub fn drain(&self) -> usize {
        let mut ran = 0;
        while self.run_next() {
            ran += 1;
        }
        if ran > 0 {
            log::trace!("ui queue drained {ran} task(s)");
        }
        ran
    }
}

impl Scheduler for UiQueue {
    fn schedule_later(&self, task: Task) {
        self.tasks.borrow_mut().push_back(task);
    }
}

impl std::fmt::Debug for UiQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiQueue")
            .field("pending", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn runs_tasks_in_submission_order() {
        let queue = UiQueue::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let seen = seen.clone();
            queue.schedule_later(Box::new(move || seen.borrow_mut().push(i)));
        }

        assert_eq!(queue.len(), 3);
        assert!(seen.borrow().is_empty());
        assert_eq!(queue.drain(), 3);
        assert_eq!(*seen.borrow(), vec![0, 1, 2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn tasks_scheduled_while_draining_run_after_pending_ones() {
        let queue = UiQueue::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        {
            let inner_queue = queue.clone();
            let seen = seen.clone();
            queue.schedule_later(Box::new(move || {
                seen.borrow_mut().push("first");
                let seen = seen.clone();
                inner_queue.schedule_later(Box::new(move || seen.borrow_mut().push("nested")));
            }));
        }
        {
            let seen = seen.clone();
            queue.schedule_later(Box::new(move || seen.borrow_mut().push("second")));
        }

        assert_eq!(queue.drain(), 3);
        assert_eq!(*seen.borrow(), vec!["first", "second", "nested"]);
    }

    #[test]
    fn run_next_on_empty_queue_is_a_no_op() {
        let queue = UiQueue::new();
        assert!(!queue.run_next());
        assert_eq!(queue.drain(), 0);
    }
}
