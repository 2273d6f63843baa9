//! On-screen notification queue
//!
//! Messages carry a priority and a lifetime in frames. The highest priority
//! message is shown; equal priorities are shown in arrival order.

use std::collections::VecDeque;

/// Default number of queued messages.
pub const DEFAULT_CAPACITY: usize = 8;

/// Frames a standard notification stays on screen.
pub const DEFAULT_DURATION: u32 = 180;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub priority: u32,
    /// Remaining frames on screen.
    pub duration: u32,
}

#[derive(Debug)]
pub struct MessageQueue {
    queue: VecDeque<Message>,
    capacity: usize,
}

impl Default for MessageQueue {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl MessageQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Queue a message, evicting the lowest priority entry when full.
    ///
    /// A message with lower priority than everything in a full queue is
    /// dropped.
    pub fn push(&mut self, text: impl Into<String>, priority: u32, duration: u32) {
        if self.queue.len() >= self.capacity {
            match self.queue.back() {
                Some(last) if last.priority <= priority => {
                    self.queue.pop_back();
                }
                _ => return,
            }
        }

        let message = Message {
            text: text.into(),
            priority,
            duration: duration.max(1),
        };
        let pos = self
            .queue
            .iter()
            .position(|m| m.priority < message.priority)
            .unwrap_or(self.queue.len());
        self.queue.insert(pos, message);
    }

    /// The message currently on screen.
    pub fn current(&self) -> Option<&Message> {
        self.queue.front()
    }

    /// Advance one frame, retiring the current message when it expires.
    pub fn tick(&mut self) {
        if let Some(front) = self.queue.front_mut() {
            front.duration -= 1;
            if front.duration == 0 {
                self.queue.pop_front();
            }
        }
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.queue.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highest_priority_first() {
        let mut q = MessageQueue::default();
        q.push("low", 1, 10);
        q.push("high", 5, 10);
        q.push("low2", 1, 10);
        let order: Vec<_> = q.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(order, ["high", "low", "low2"]);
    }

    #[test]
    fn expires_after_duration() {
        let mut q = MessageQueue::default();
        q.push("a", 1, 2);
        q.push("b", 1, 1);
        q.tick();
        assert_eq!(q.current().unwrap().text, "a");
        q.tick();
        assert_eq!(q.current().unwrap().text, "b");
        q.tick();
        assert!(q.is_empty());
    }

    #[test]
    fn full_queue_evicts_lowest() {
        let mut q = MessageQueue::new(2);
        q.push("a", 2, 10);
        q.push("b", 1, 10);
        q.push("c", 3, 10);
        let order: Vec<_> = q.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(order, ["c", "a"]);

        q.push("dropped", 0, 10);
        assert_eq!(q.len(), 2);
        assert!(q.iter().all(|m| m.text != "dropped"));
    }
}
