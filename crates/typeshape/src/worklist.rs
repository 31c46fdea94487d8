//! Deferred class expansions.

use std::collections::VecDeque;

use crate::registry::EntryId;
use crate::resolver::PathEntry;
use crate::type_ref::TypeRef;

/// One pending expansion: walk `ty`'s members into the body of `target`.
#[derive(Debug, Clone)]
pub struct WorkItem {
    /// Type whose member walk discovered `ty`, `None` for a build root
    pub owner: Option<TypeRef>,
    /// Seed frame carrying `ty`'s own generic bindings
    pub path: PathEntry,
    pub ty: TypeRef,
    pub target: EntryId,
}

/// FIFO of pending expansions.
///
/// The queue itself does not deduplicate; the registry only ever enqueues a
/// signature once.
#[derive(Debug, Default)]
pub struct Worklist {
    queue: VecDeque<WorkItem>,
    processed: usize,
}

impl Worklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: WorkItem) {
        self.queue.push_back(item);
    }

    pub fn pop(&mut self) -> Option<WorkItem> {
        let item = self.queue.pop_front()?;
        self.processed += 1;
        Some(item)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of items popped so far.
    pub fn processed(&self) -> usize {
        self.processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, target: usize) -> WorkItem {
        WorkItem {
            owner: None,
            path: PathEntry::default(),
            ty: TypeRef::class(name),
            target: EntryId(target),
        }
    }

    #[test]
    fn pops_in_insertion_order() {
        let mut worklist = Worklist::new();
        worklist.push(item("A", 0));
        worklist.push(item("B", 1));
        assert_eq!(worklist.len(), 2);

        assert_eq!(worklist.pop().unwrap().ty, TypeRef::class("A"));
        assert_eq!(worklist.pop().unwrap().target, EntryId(1));
        assert!(worklist.pop().is_none());
        assert!(worklist.is_empty());
        assert_eq!(worklist.processed(), 2);
    }
}
