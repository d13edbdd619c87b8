//! Ordered set of scheduled tasks
//!
//! Tasks are kept in insertion order, which is also the order the timeline
//! draws them in within a tick.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique task identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(u64);

impl TaskId {
    /// Raw id value
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// Scheduled payload with its id
#[derive(Debug, Clone, PartialEq)]
pub struct Task<T> {
    /// Id handed out by [`Scheduler::add_task`]
    pub id: TaskId,
    /// Scheduled value
    pub payload: T,
}

/// Insertion-ordered task set handing out fresh ids
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    tasks: Vec<Task<T>>,
    next_id: u64,
}

impl<T> Scheduler<T> {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 0,
        }
    }

    /// Schedule a payload, returning its id
    ///
    /// Ids are never reused, not even after [`Scheduler::clear`].
    pub fn add_task(&mut self, payload: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push(Task { id, payload });
        id
    }

    /// Remove a task; unknown ids are ignored
    pub fn remove_task(&mut self, id: TaskId) -> Option<T> {
        let index = self.tasks.iter().position(|task| task.id == id)?;
        Some(self.tasks.remove(index).payload)
    }

    /// Drop every task
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Remove every task, returning the payloads in insertion order
    pub fn drain(&mut self) -> impl Iterator<Item = Task<T>> + '_ {
        self.tasks.drain(..)
    }

    /// Check if no task is scheduled
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of scheduled tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Payload of a task
    pub fn get(&self, id: TaskId) -> Option<&T> {
        self.tasks
            .iter()
            .find(|task| task.id == id)
            .map(|task| &task.payload)
    }

    /// Check if a task is scheduled
    pub fn contains(&self, id: TaskId) -> bool {
        self.get(id).is_some()
    }

    /// Tasks in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Task<T>> {
        self.tasks.iter()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn add_then_remove_leaves_empty() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.add_task("a");
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.get(id), Some(&"a"));

        assert_eq!(scheduler.remove_task(id), Some("a"));
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.remove_task(id), None);
    }

    #[test]
    fn iterates_in_insertion_order() {
        let mut scheduler = Scheduler::new();
        let a = scheduler.add_task(1);
        let b = scheduler.add_task(2);
        let c = scheduler.add_task(3);
        scheduler.remove_task(b);
        let d = scheduler.add_task(4);

        let ids: Vec<_> = scheduler.iter().map(|task| task.id).collect();
        assert_eq!(ids, vec![a, c, d]);
    }

    #[test]
    fn ids_survive_clear() {
        let mut scheduler = Scheduler::new();
        let first = scheduler.add_task(());
        scheduler.clear();
        assert!(scheduler.is_empty());
        let second = scheduler.add_task(());
        assert_ne!(first, second);
        assert!(!scheduler.contains(first));
    }

    #[test]
    fn drain_empties_in_order() {
        let mut scheduler = Scheduler::new();
        scheduler.add_task('x');
        scheduler.add_task('y');
        let drained: Vec<_> = scheduler.drain().map(|task| task.payload).collect();
        assert_eq!(drained, vec!['x', 'y']);
        assert!(scheduler.is_empty());
    }

    proptest! {
        #[test]
        fn ids_are_unique(ops in prop::collection::vec(any::<bool>(), 0..64)) {
            let mut scheduler = Scheduler::new();
            let mut seen = std::collections::HashSet::new();
            for add in ops {
                if add {
                    let id = scheduler.add_task(());
                    prop_assert!(seen.insert(id));
                } else {
                    let first = scheduler.iter().next().map(|task| task.id);
                    if let Some(id) = first {
                        scheduler.remove_task(id);
                    }
                }
            }
        }

        #[test]
        fn clear_empties_any_set(count in 0usize..32) {
            let mut scheduler = Scheduler::new();
            for i in 0..count {
                scheduler.add_task(i);
            }
            scheduler.clear();
            prop_assert!(scheduler.is_empty());
            prop_assert_eq!(scheduler.len(), 0);
        }
    }
}
