//! Simulated clock with cancellable periodic tasks
//!
//! Nothing fires on its own: the owner advances the clock and pulls due
//! tasks one at a time, so every callback runs to completion on the caller's
//! thread before the next one is considered.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Handle to a registered periodic task
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u64);

/// What a task does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Physics and position update
    Tick,
    /// Roll for an obstacle
    ObstacleCheck,
    /// One speed-controller step
    SpeedControl,
}

#[derive(Debug, Clone)]
struct PeriodicTask {
    kind: TaskKind,
    interval_ms: u64,
}

/// Millisecond clock driving periodic tasks
#[derive(Debug, Default)]
pub struct Scheduler {
    now_ms: u64,
    next_id: u64,
    next_seq: u64,
    tasks: HashMap<TaskId, PeriodicTask>,
    /// (due, registration sequence, task); cancelled entries are skipped lazily
    queue: BinaryHeap<Reverse<(u64, u64, TaskId)>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Register a task that first fires one interval from now
    pub fn schedule_every(&mut self, kind: TaskKind, interval_ms: u64) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let interval_ms = interval_ms.max(1);
        self.tasks.insert(id, PeriodicTask { kind, interval_ms });
        self.enqueue(self.now_ms + interval_ms, id);
        id
    }

    fn enqueue(&mut self, due_ms: u64, id: TaskId) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse((due_ms, seq, id)));
    }

    /// Returns false if the task was not registered
    pub fn cancel(&mut self, id: TaskId) -> bool {
        self.tasks.remove(&id).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.tasks.clear();
        self.queue.clear();
    }

    pub fn is_active(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }

    pub fn active_count(&self) -> usize {
        self.tasks.len()
    }

    /// Pop the earliest task due at or before `until_ms`, moving the clock to
    /// its due time and rescheduling it one interval later.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TaskId, TaskKind)> {
        while let Some(Reverse((due_ms, _, id))) = self.queue.peek().copied() {
            if due_ms > until_ms {
                return None;
            }
            self.queue.pop();

            let Some(task) = self.tasks.get(&id) else {
                continue;
            };
            let (kind, interval_ms) = (task.kind, task.interval_ms);

            self.now_ms = self.now_ms.max(due_ms);
            self.enqueue(due_ms + interval_ms, id);
            return Some((id, kind));
        }
        None
    }

    /// Move the clock forward without firing anything
    pub fn advance_to(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}
