use crate::tree::ids::NodeId;

/// Holds all items in one slab and hands out stable indices.
/// Released slots go on a free list and are reused by later allocations,
/// so retiring a subtree gives its memory back immediately.
#[derive(Debug, Clone)]
pub(crate) struct Arena<T> {
    storage: Vec<Option<T>>,
    free: Vec<usize>,
    live: usize,
}

impl<T> Arena<T> {
    /// Create a new empty storage
    pub fn new() -> Self {
        Arena {
            storage: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Allocate a new item to the storage and return the associated NodeId
    pub fn allocate(&mut self, item: T) -> NodeId {
        self.live += 1;
        match self.free.pop() {
            Some(index) => {
                self.storage[index] = Some(item);
                NodeId::from(index)
            }
            None => {
                let id = NodeId::from(self.storage.len());
                self.storage.push(Some(item));
                id
            }
        }
    }

    /// Take an item out of the arena, returning its slot to the free list
    pub fn release(&mut self, node_id: NodeId) -> Option<T> {
        let item = self.storage.get_mut(node_id.index())?.take()?;
        self.free.push(node_id.index());
        self.live -= 1;
        Some(item)
    }

    /// Retrieve an associated item from the Arena
    pub fn get(&self, node_id: NodeId) -> Option<&T> {
        self.storage.get(node_id.index())?.as_ref()
    }

    /// Retrieve an associated item from the Arena as a mutable borrow
    pub fn get_mut(&mut self, node_id: NodeId) -> Option<&mut T> {
        self.storage.get_mut(node_id.index())?.as_mut()
    }

    /// Number of live items
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check if the Arena holds no live item
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterate over live items together with their ids
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &T)> {
        self.storage
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|item| (NodeId::from(index), item)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_slots_are_reused() {
        let mut arena = Arena::new();
        let a = arena.allocate("a");
        let b = arena.allocate("b");
        assert_eq!(arena.len(), 2);

        assert_eq!(arena.release(a), Some("a"));
        assert_eq!(arena.release(a), None);
        assert_eq!(arena.len(), 1);
        assert!(arena.get(a).is_none());

        let c = arena.allocate("c");
        assert_eq!(c, a);
        assert_eq!(arena.get(c), Some(&"c"));
        assert_eq!(arena.get(b), Some(&"b"));
        assert_eq!(arena.iter().count(), 2);
    }

    #[test]
    fn empty_after_releasing_everything() {
        let mut arena = Arena::new();
        let ids: Vec<_> = (0..4).map(|i| arena.allocate(i)).collect();
        for id in ids {
            arena.release(id);
        }
        assert!(arena.is_empty());
        assert_eq!(arena.iter().count(), 0);
    }
}
