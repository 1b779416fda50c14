//! First-in first-out command queue with optional backpressure.
//!
//! Commands are applied in exactly the order they were pushed; there is no
//! prioritization. A bounded queue rejects new work instead of growing.

use std::collections::VecDeque;
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct QueueFull {
    pub max_len: usize,
}

impl fmt::Display for QueueFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command queue is full ({} pending)", self.max_len)
    }
}

impl std::error::Error for QueueFull {}

#[derive(Debug)]
pub struct TaskQueue<T> {
    items: VecDeque<T>,
    max_len: Option<usize>,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self {
            items: VecDeque::new(),
            max_len: None,
        }
    }
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            max_len: Some(max_len),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn try_push(&mut self, item: T) -> Result<(), QueueFull> {
        if let Some(max_len) = self.max_len
            && self.items.len() >= max_len
        {
            return Err(QueueFull { max_len });
        }
        self.items.push_back(item);
        Ok(())
    }

    /// Takes every pending item, oldest first.
    pub fn drain_all(&mut self) -> Vec<T> {
        self.items.drain(..).collect()
    }
}
