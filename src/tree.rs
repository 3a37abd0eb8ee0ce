use crate::strategy::Mapping;
use std::cmp::{self, Ordering};

/// Height-balanced (AVL) search tree of mappings keyed by first codepoint.
///
/// Nodes live in one arena and refer to their children by index. The height
/// of the tree bounds the number of range comparisons the emitted code makes
/// before reaching a result.
#[derive(Clone, Debug, Default)]
pub struct DispatchTree {
    nodes: Vec<Node>,
    root: Option<usize>,
}

#[derive(Clone, Debug)]
struct Node {
    mapping: Mapping,
    left: Option<usize>,
    right: Option<usize>,
    height: usize,
}

fn compare(a: u32, b: u32) -> Ordering {
    a.cmp(&b)
}

impl DispatchTree {
    pub fn new() -> Self {
        DispatchTree {
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Inserts `mapping`, returning `false` without modifying the tree if a
    /// mapping with the same first codepoint is already present.
    pub fn insert(&mut self, mapping: Mapping) -> bool {
        let mut inserted = false;
        let root = self.insert_at(self.root, mapping, &mut inserted);
        self.root = Some(root);
        inserted
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes on the longest root-to-leaf path; 0 when empty.
    pub fn height(&self) -> usize {
        self.height_of(self.root)
    }

    /// Mappings in ascending codepoint order.
    pub fn mappings(&self) -> Vec<&Mapping> {
        let mut out = Vec::with_capacity(self.nodes.len());
        self.collect_in_order(self.root, &mut out);
        out
    }

    /// Lays the tree out as an implicit binary heap: the root at index 0 and
    /// the children of index `i` at `2i+1` and `2i+2`. Slots with no node are
    /// `None`.
    pub fn heap_order(&self) -> Vec<Option<&Mapping>> {
        let height = self.height();
        let mut slots = vec![None; (1usize << height) - 1];
        self.place(self.root, 0, &mut slots);
        slots
    }

    /// Folds `codepoint` by walking the tree the same way the emitted code
    /// does. Codepoints outside every mapping fold to themselves.
    pub fn fold(&self, codepoint: u32) -> u32 {
        let mut cursor = self.root;
        while let Some(id) = cursor {
            let node = &self.nodes[id];
            if codepoint < node.mapping.first {
                cursor = node.left;
            } else if codepoint > node.mapping.last {
                cursor = node.right;
            } else {
                return node.mapping.apply(codepoint);
            }
        }
        codepoint
    }

    fn insert_at(&mut self, at: Option<usize>, mapping: Mapping, inserted: &mut bool) -> usize {
        let id = match at {
            Some(id) => id,
            None => {
                *inserted = true;
                self.nodes.push(Node {
                    mapping,
                    left: None,
                    right: None,
                    height: 1,
                });
                return self.nodes.len() - 1;
            }
        };
        match compare(mapping.first, self.nodes[id].mapping.first) {
            Ordering::Less => {
                let left = self.nodes[id].left;
                let left = self.insert_at(left, mapping, inserted);
                self.nodes[id].left = Some(left);
            }
            Ordering::Greater => {
                let right = self.nodes[id].right;
                let right = self.insert_at(right, mapping, inserted);
                self.nodes[id].right = Some(right);
            }
            Ordering::Equal => return id,
        }
        self.rebalance(id)
    }

    fn height_of(&self, id: Option<usize>) -> usize {
        id.map_or(0, |id| self.nodes[id].height)
    }

    fn update_height(&mut self, id: usize) {
        let node = &self.nodes[id];
        let height = 1 + cmp::max(self.height_of(node.left), self.height_of(node.right));
        self.nodes[id].height = height;
    }

    fn balance_factor(&self, id: usize) -> isize {
        let node = &self.nodes[id];
        self.height_of(node.left) as isize - self.height_of(node.right) as isize
    }

    fn rebalance(&mut self, id: usize) -> usize {
        self.update_height(id);
        let balance = self.balance_factor(id);
        if balance > 1 {
            if let Some(left) = self.nodes[id].left {
                if self.balance_factor(left) < 0 {
                    let left = self.rotate_left(left);
                    self.nodes[id].left = Some(left);
                }
            }
            return self.rotate_right(id);
        }
        if balance < -1 {
            if let Some(right) = self.nodes[id].right {
                if self.balance_factor(right) > 0 {
                    let right = self.rotate_right(right);
                    self.nodes[id].right = Some(right);
                }
            }
            return self.rotate_left(id);
        }
        id
    }

    fn rotate_right(&mut self, id: usize) -> usize {
        let pivot = match self.nodes[id].left {
            Some(pivot) => pivot,
            None => return id,
        };
        self.nodes[id].left = self.nodes[pivot].right;
        self.nodes[pivot].right = Some(id);
        self.update_height(id);
        self.update_height(pivot);
        pivot
    }

    fn rotate_left(&mut self, id: usize) -> usize {
        let pivot = match self.nodes[id].right {
            Some(pivot) => pivot,
            None => return id,
        };
        self.nodes[id].right = self.nodes[pivot].left;
        self.nodes[pivot].left = Some(id);
        self.update_height(id);
        self.update_height(pivot);
        pivot
    }

    fn collect_in_order<'a>(&'a self, at: Option<usize>, out: &mut Vec<&'a Mapping>) {
        if let Some(id) = at {
            let node = &self.nodes[id];
            self.collect_in_order(node.left, out);
            out.push(&node.mapping);
            self.collect_in_order(node.right, out);
        }
    }

    fn place<'a>(&'a self, at: Option<usize>, slot: usize, slots: &mut [Option<&'a Mapping>]) {
        if let Some(id) = at {
            let node = &self.nodes[id];
            slots[slot] = Some(&node.mapping);
            self.place(node.left, 2 * slot + 1, slots);
            self.place(node.right, 2 * slot + 2, slots);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::MappingStrategy;

    fn single(codepoint: u32) -> Mapping {
        Mapping {
            first: codepoint,
            last: codepoint,
            strategy: MappingStrategy::Single {
                result: codepoint + 1,
            },
        }
    }

    fn assert_avl(tree: &DispatchTree) {
        for id in 0..tree.nodes.len() {
            assert!(tree.balance_factor(id).abs() <= 1, "node {} unbalanced", id);
        }
    }

    #[test]
    fn ascending_inserts_stay_balanced() {
        let mut tree = DispatchTree::new();
        for codepoint in (0..1023).map(|i| i * 2) {
            assert!(tree.insert(single(codepoint)));
        }
        assert_avl(&tree);
        assert_eq!(tree.len(), 1023);
        assert!(tree.height() <= 11);
    }

    #[test]
    fn duplicate_start_is_ignored() {
        let mut tree = DispatchTree::new();
        assert!(tree.insert(single(0x41)));
        assert!(!tree.insert(single(0x41)));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.fold(0x41), 0x42);
    }

    #[test]
    fn in_order_is_sorted() {
        let mut tree = DispatchTree::new();
        for codepoint in [50, 10, 40, 20, 30, 60, 0] {
            tree.insert(single(codepoint));
        }
        assert_avl(&tree);
        let firsts: Vec<u32> = tree.mappings().iter().map(|m| m.first).collect();
        assert_eq!(firsts, [0, 10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn heap_order_links_children() {
        let mut tree = DispatchTree::new();
        for codepoint in [10, 20, 30] {
            tree.insert(single(codepoint));
        }
        let slots = tree.heap_order();
        assert_eq!(slots.len(), 3);
        let firsts: Vec<Option<u32>> = slots.iter().map(|m| m.map(|m| m.first)).collect();
        assert_eq!(firsts, [Some(20), Some(10), Some(30)]);
    }

    #[test]
    fn fold_passes_through_uncovered() {
        let mut tree = DispatchTree::new();
        for codepoint in [10, 20, 30] {
            tree.insert(single(codepoint));
        }
        assert_eq!(tree.fold(20), 21);
        assert_eq!(tree.fold(25), 25);
        assert_eq!(tree.fold(0), 0);
        assert!(DispatchTree::new().heap_order().is_empty());
    }
}
