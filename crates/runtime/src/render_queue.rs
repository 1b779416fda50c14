use std::sync::Arc;

use parking_lot::Mutex;

use crate::work_queue::{QueueFull, TaskQueue};

/// Handoff point between input threads and the render thread.
///
/// Any number of producers may enqueue; the single consumer drains the whole
/// backlog once per frame, so commands are observed strictly in order.
#[derive(Debug)]
pub struct RenderQueue<T> {
    inner: Arc<Mutex<TaskQueue<T>>>,
}

impl<T> Clone for RenderQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> RenderQueue<T> {
    pub fn unbounded() -> Self {
        Self {
            inner: Arc::new(Mutex::new(TaskQueue::new())),
        }
    }

    pub fn bounded(max_len: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TaskQueue::with_max_len(max_len))),
        }
    }

    pub fn submit(&self, command: T) -> Result<(), QueueFull> {
        self.inner.lock().try_push(command)
    }

    pub fn drain(&self) -> Vec<T> {
        self.inner.lock().drain_all()
    }

    pub fn pending(&self) -> usize {
        self.inner.lock().len()
    }
}
