//! Ordered Queue Module
//!
//! Recency ordering for cache entries as a doubly-linked list stored in an
//! arena. Nodes are addressed by stable indices instead of pointers, and two
//! sentinel nodes bound the chain so linking never special-cases the ends.
//!
//! - Head side = most recently used
//! - Tail side = least recently used

use crate::cache::CacheEntry;

/// Stable address of a node inside the queue's arena.
pub type NodeId = usize;

const HEAD: NodeId = 0;
const TAIL: NodeId = 1;

// == Node ==
#[derive(Debug)]
struct Node<V> {
    /// None for sentinels and free slots
    entry: Option<CacheEntry<V>>,
    prev: NodeId,
    next: NodeId,
    linked: bool,
}

impl<V> Node<V> {
    fn sentinel(prev: NodeId, next: NodeId) -> Self {
        Self {
            entry: None,
            prev,
            next,
            linked: false,
        }
    }
}

// == Ordered Queue ==
/// Doubly-linked recency list over an arena of entries.
///
/// Every operation except iteration is O(1). Unlinking a node only detaches
/// it; the slot (and its entry) stays allocated until [`release`] is called,
/// so an entry can be repositioned without being rebuilt.
///
/// [`release`]: OrderedQueue::release
#[derive(Debug)]
pub struct OrderedQueue<V> {
    nodes: Vec<Node<V>>,
    free: Vec<NodeId>,
    len: usize,
}

impl<V> OrderedQueue<V> {
    // == Constructor ==
    /// Creates an empty queue with its two sentinels linked to each other.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty queue with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity + 2);
        nodes.push(Node::sentinel(HEAD, TAIL));
        nodes.push(Node::sentinel(HEAD, TAIL));
        Self {
            nodes,
            free: Vec::new(),
            len: 0,
        }
    }

    // == Push Front ==
    /// Stores `entry` in a fresh slot and links it at the head.
    pub fn push_front(&mut self, entry: CacheEntry<V>) -> NodeId {
        let id = match self.free.pop() {
            Some(id) => {
                self.nodes[id].entry = Some(entry);
                id
            }
            None => {
                self.nodes.push(Node {
                    entry: Some(entry),
                    prev: HEAD,
                    next: HEAD,
                    linked: false,
                });
                self.nodes.len() - 1
            }
        };
        self.insert_at_head(id);
        id
    }

    // == Insert At Head ==
    /// Splices a detached node between the head sentinel and its successor.
    ///
    /// Returns false (and changes nothing) if `id` is a sentinel, a free slot
    /// or already linked.
    pub fn insert_at_head(&mut self, id: NodeId) -> bool {
        if !self.is_detached_entry(id) {
            return false;
        }
        let first = self.nodes[HEAD].next;
        self.nodes[id].prev = HEAD;
        self.nodes[id].next = first;
        self.nodes[id].linked = true;
        self.nodes[first].prev = id;
        self.nodes[HEAD].next = id;
        self.len += 1;
        true
    }

    // == Unlink ==
    /// Detaches a linked node from wherever it sits in the chain.
    ///
    /// Returns false if `id` is not a linked entry.
    pub fn unlink(&mut self, id: NodeId) -> bool {
        if !self.is_linked(id) {
            return false;
        }
        let (prev, next) = (self.nodes[id].prev, self.nodes[id].next);
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
        self.nodes[id].linked = false;
        self.len -= 1;
        true
    }

    // == Move To Front ==
    /// Marks a linked entry as most recently used.
    pub fn move_to_front(&mut self, id: NodeId) -> bool {
        if self.nodes[HEAD].next == id {
            return self.is_linked(id);
        }
        self.unlink(id) && self.insert_at_head(id)
    }

    // == Release ==
    /// Frees the slot of a detached node and hands back its entry.
    pub fn release(&mut self, id: NodeId) -> Option<CacheEntry<V>> {
        if !self.is_detached_entry(id) {
            return None;
        }
        let entry = self.nodes[id].entry.take();
        self.free.push(id);
        entry
    }

    // == Remove ==
    /// Unlinks a node and frees its slot in one call.
    pub fn remove(&mut self, id: NodeId) -> Option<CacheEntry<V>> {
        if self.unlink(id) {
            self.release(id)
        } else {
            None
        }
    }

    // == Peek ==
    /// Returns the least recently used node, if any.
    pub fn peek_lru(&self) -> Option<NodeId> {
        let last = self.nodes[TAIL].prev;
        (last != HEAD).then_some(last)
    }

    /// Returns the most recently used node, if any.
    pub fn peek_mru(&self) -> Option<NodeId> {
        let first = self.nodes[HEAD].next;
        (first != TAIL).then_some(first)
    }

    /// Returns the node after `id` in head-to-tail order.
    pub fn next_of(&self, id: NodeId) -> Option<NodeId> {
        if !self.is_linked(id) {
            return None;
        }
        let next = self.nodes[id].next;
        (next != TAIL).then_some(next)
    }

    // == Entry Access ==
    pub fn get(&self, id: NodeId) -> Option<&CacheEntry<V>> {
        self.nodes.get(id).and_then(|node| node.entry.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut CacheEntry<V>> {
        self.nodes.get_mut(id).and_then(|node| node.entry.as_mut())
    }

    // == Length ==
    /// Returns the number of linked entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates linked entries from most to least recently used.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            queue: self,
            cursor: self.nodes[HEAD].next,
            remaining: self.len,
        }
    }

    // == Consistency ==
    /// Walks the chain in both directions and checks that each walk visits
    /// exactly `len` entries before reaching the opposite sentinel.
    pub fn links_consistent(&self) -> bool {
        self.walk_len(true) == Some(self.len) && self.walk_len(false) == Some(self.len)
    }

    /// Counts linked nodes between the sentinels in one direction. Gives up
    /// with None on a dead link or once the walk runs past `len`.
    fn walk_len(&self, forward: bool) -> Option<usize> {
        let (mut cursor, stop) = if forward {
            (self.nodes[HEAD].next, TAIL)
        } else {
            (self.nodes[TAIL].prev, HEAD)
        };
        let mut count = 0;
        while cursor != stop {
            if count > self.len || !self.is_linked(cursor) {
                return None;
            }
            count += 1;
            let node = &self.nodes[cursor];
            cursor = if forward { node.next } else { node.prev };
        }
        Some(count)
    }

    fn is_linked(&self, id: NodeId) -> bool {
        id > TAIL && self.nodes.get(id).is_some_and(|node| node.linked)
    }

    fn is_detached_entry(&self, id: NodeId) -> bool {
        id > TAIL
            && self
                .nodes
                .get(id)
                .is_some_and(|node| !node.linked && node.entry.is_some())
    }
}

impl<V> Default for OrderedQueue<V> {
    fn default() -> Self {
        Self::new()
    }
}

// == Iterator ==
/// Head-to-tail iterator over `(NodeId, &CacheEntry)`.
pub struct Iter<'a, V> {
    queue: &'a OrderedQueue<V>,
    cursor: NodeId,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (NodeId, &'a CacheEntry<V>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 || self.cursor == TAIL {
            return None;
        }
        let id = self.cursor;
        let node = &self.queue.nodes[id];
        self.cursor = node.next;
        self.remaining -= 1;
        node.entry.as_ref().map(|entry| (id, entry))
    }
}
