//! An addressable priority queue implemented with a 4-ary heap.
//!
//! Keys are tentative weights, elements are node ids, and every inserted node
//! carries a mutable payload. Insertion, `decrease_key` and `pop` have
//! `O(log n)` time complexity, everything else is `O(1)`.
//!
//! Nodes stay known to the queue after they have been popped: `was_inserted`,
//! `key` and `data` keep answering for settled nodes until the next `clear`.
//! The relaxation loops and the stall test of the search engines rely on
//! exactly that behaviour.
//!
//! # Examples
//!
//! ```
//! use road_matrix_router::datastr::query_heap::QueryHeap;
//!
//! let mut heap = QueryHeap::new(3);
//! heap.insert(0, 42, "far");
//! heap.insert(1, 23, "near");
//! heap.decrease_key(0, 1);
//! assert_eq!(heap.pop(), Some(0));
//! assert_eq!(heap.pop(), Some(1));
//! // settled nodes keep their final key around
//! assert_eq!(heap.key(1), 23);
//! assert!(heap.was_inserted(1));
//! assert!(heap.is_empty());
//! ```

use crate::datastr::graph::*;
use crate::util::in_range_option::InRangeOption;

const TREE_ARITY: usize = 4;
const INVALID_POSITION: usize = usize::MAX;

#[derive(Debug)]
struct HeapNode<Data> {
    node: NodeId,
    key: EdgeWeight,
    data: Data,
}

/// Addressable min-heap over `(key, node)` pairs with per node payloads.
/// Ties are broken by insertion order, so runs are deterministic.
#[derive(Debug)]
pub struct QueryHeap<Data> {
    // node -> slot in `inserted`, lives until `clear`
    slots: Vec<InRangeOption<u32>>,
    // everything inserted since the last `clear`, keys kept up to date
    inserted: Vec<HeapNode<Data>>,
    // slot -> position in `heap`, INVALID_POSITION once settled
    positions: Vec<usize>,
    // slots ordered as a 4-ary min-heap
    heap: Vec<u32>,
}

impl<Data> QueryHeap<Data> {
    /// Creates an empty `QueryHeap` for node ids in `[0, num_nodes)`.
    pub fn new(num_nodes: usize) -> QueryHeap<Data> {
        QueryHeap {
            slots: vec![InRangeOption::NONE; num_nodes],
            inserted: Vec::new(),
            positions: Vec::new(),
            heap: Vec::new(),
        }
    }

    /// Grow (or shrink) the addressable node id range. Only allowed while empty.
    pub fn resize(&mut self, num_nodes: usize) {
        debug_assert!(self.inserted.is_empty(), "tried to resize a non empty heap");
        self.slots.resize(num_nodes, InRangeOption::NONE);
    }

    /// Number of queued (not yet popped) nodes.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Has this node been inserted since the last `clear`? Stays true after popping.
    pub fn was_inserted(&self, node: NodeId) -> bool {
        self.slots[node as usize].value().is_some()
    }

    /// The current key of a queued node, or the final key of a settled one.
    pub fn key(&self, node: NodeId) -> EdgeWeight {
        self.inserted[self.slot(node)].key
    }

    pub fn data(&self, node: NodeId) -> &Data {
        &self.inserted[self.slot(node)].data
    }

    pub fn data_mut(&mut self, node: NodeId) -> &mut Data {
        let slot = self.slot(node);
        &mut self.inserted[slot].data
    }

    /// Insert a node with the given key and payload.
    /// Panics if the node was already inserted since the last `clear`.
    pub fn insert(&mut self, node: NodeId, key: EdgeWeight, data: Data) {
        assert!(!self.was_inserted(node));
        let slot = self.inserted.len() as u32;
        self.slots[node as usize] = InRangeOption::some(slot);
        self.inserted.push(HeapNode { node, key, data });
        let position = self.heap.len();
        self.positions.push(position);
        self.heap.push(slot);
        self.move_up_in_tree(position);
    }

    /// Lower the key of a queued node. The new key must not be larger than the current one.
    pub fn decrease_key(&mut self, node: NodeId, new_key: EdgeWeight) {
        let slot = self.slot(node);
        debug_assert!(new_key <= self.inserted[slot].key, "decrease_key with larger key");
        let position = self.positions[slot];
        debug_assert!(position != INVALID_POSITION, "decrease_key on settled node");
        self.inserted[slot].key = new_key;
        self.move_up_in_tree(position);
    }

    /// Remove the minimal node from the heap and return its id, or `None` if empty.
    pub fn pop(&mut self) -> Option<NodeId> {
        if self.heap.is_empty() {
            return None;
        }
        let min_slot = self.heap.swap_remove(0);
        self.positions[min_slot as usize] = INVALID_POSITION;
        if let Some(&moved) = self.heap.first() {
            self.positions[moved as usize] = 0;
            self.move_down_in_tree(0);
        }
        Some(self.inserted[min_slot as usize].node)
    }

    /// Forget all inserted nodes. Amortized linear in the number of insertions since the last `clear`.
    pub fn clear(&mut self) {
        for entry in self.inserted.drain(..) {
            self.slots[entry.node as usize] = InRangeOption::NONE;
        }
        self.positions.clear();
        self.heap.clear();
    }

    fn slot(&self, node: NodeId) -> usize {
        self.slots[node as usize].value().expect("node was never inserted") as usize
    }

    // (key, insertion order) lexicographically
    fn less(&self, a_slot: u32, b_slot: u32) -> bool {
        let a = &self.inserted[a_slot as usize];
        let b = &self.inserted[b_slot as usize];
        (a.key, a_slot) < (b.key, b_slot)
    }

    fn move_up_in_tree(&mut self, mut position: usize) {
        while position > 0 {
            let parent = (position - 1) / TREE_ARITY;
            if self.less(self.heap[parent], self.heap[position]) {
                break;
            }
            self.positions.swap(self.heap[parent] as usize, self.heap[position] as usize);
            self.heap.swap(parent, position);
            position = parent;
        }
    }

    fn move_down_in_tree(&mut self, mut position: usize) {
        loop {
            let Some(smallest_child) = self.children_index_range(position).reduce(|a, b| if self.less(self.heap[b], self.heap[a]) { b } else { a }) else {
                return; // no children at all
            };
            if self.less(self.heap[position], self.heap[smallest_child]) {
                return; // no child is smaller
            }
            self.positions.swap(self.heap[smallest_child] as usize, self.heap[position] as usize);
            self.heap.swap(smallest_child, position);
            position = smallest_child;
        }
    }

    fn children_index_range(&self, parent: usize) -> std::ops::Range<usize> {
        let first_child = TREE_ARITY * parent + 1;
        let last_child = std::cmp::min(TREE_ARITY * parent + TREE_ARITY + 1, self.heap.len());
        first_child..last_child
    }
}
