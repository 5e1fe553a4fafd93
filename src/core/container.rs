use super::types::ProcessId;
use log::debug;
use std::collections::VecDeque;

/// Bounded stock buffer shared by producer and consumer processes.
///
/// A `put` or `get` request joins the matching FIFO wait queue; the head of a
/// queue is satisfied as soon as its condition holds, mutating the level
/// atomically with respect to every other process. Queue heads never
/// overtake, so requests are served first-requested, first-served.
pub struct Container {
    name: String,
    capacity: u64,
    level: u64,
    get_waiters: VecDeque<(ProcessId, u64)>,
    put_waiters: VecDeque<(ProcessId, u64)>,
}

impl Container {
    pub(crate) fn new(name: &str, capacity: u64, initial: u64) -> Self {
        Self {
            name: name.to_string(),
            capacity,
            level: initial,
            get_waiters: VecDeque::new(),
            put_waiters: VecDeque::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn level(&self) -> u64 {
        self.level
    }

    pub(crate) fn enqueue_get(&mut self, process: ProcessId, amount: u64) {
        self.get_waiters.push_back((process, amount));
    }

    pub(crate) fn enqueue_put(&mut self, process: ProcessId, amount: u64) {
        self.put_waiters.push_back((process, amount));
    }

    /// Satisfy queue heads until neither side can make progress.
    ///
    /// Returns the processes whose pending operation completed, in completion
    /// order. A satisfied get frees capacity for waiting puts and vice versa,
    /// so both queues are re-visited until a full pass changes nothing.
    pub(crate) fn drain(&mut self) -> Vec<ProcessId> {
        let mut released = Vec::new();
        loop {
            let mut progressed = false;

            while let Some(&(process, amount)) = self.get_waiters.front() {
                if self.level < amount {
                    break;
                }
                self.level -= amount;
                self.get_waiters.pop_front();
                debug!(
                    "[Container:{}] get {} satisfied (level {}/{})",
                    self.name, amount, self.level, self.capacity
                );
                released.push(process);
                progressed = true;
            }

            while let Some(&(process, amount)) = self.put_waiters.front() {
                if self.level + amount > self.capacity {
                    break;
                }
                self.level += amount;
                self.put_waiters.pop_front();
                debug!(
                    "[Container:{}] put {} satisfied (level {}/{})",
                    self.name, amount, self.level, self.capacity
                );
                released.push(process);
                progressed = true;
            }

            if !progressed {
                return released;
            }
        }
    }
}
