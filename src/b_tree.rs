use std::fmt::Debug;
use std::mem;

// https://en.wikipedia.org/wiki/B-tree
// There are two common conventions for sizing B-tree nodes (Knuth order and
// CLRS minimum degree): https://stackoverflow.com/questions/28846377/what-is-the-difference-btw-order-and-degree-in-terms-of-tree-data-structure
// This uses the CLRS minimum degree t: every node holds at most 2t-1 keys,
// and every non-root node holds at least t-1.

pub struct BTree<T: Ord + Debug + Clone> {
    root: Option<Box<Node<T>>>,
    degree: usize,
}

// An internal node with k keys always has exactly k+1 children; a leaf has
// none. Children are owned through Box, so split and merge move them between
// parents without ever aliasing a subtree.
struct Node<T: Ord + Debug + Clone> {
    keys: Vec<T>,
    children: Vec<Box<Node<T>>>,
    leaf: bool,
    degree: usize,
}

impl<T: Ord + Debug + Clone> BTree<T> {
    /// Constructor method for BTree
    ///
    /// Takes the minimum degree t shared by every node: each non-root node
    /// holds between t-1 and 2t-1 keys, and an internal node with k keys has
    /// k+1 children.
    ///
    /// Panics if t < 2, the smallest degree for which the split and merge
    /// arithmetic is well-defined.
    pub fn new(min_degree: usize) -> Self {
        assert!(min_degree >= 2, "BTree minimum degree must be at least 2");
        BTree {
            root: None,
            degree: min_degree,
        }
    }

    /// Returns true when the tree holds no keys.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of node levels from the root down to the leaves (0 when empty).
    ///
    /// All leaves sit at the same depth, so walking the first child at every
    /// level measures the whole tree.
    pub fn height(&self) -> usize {
        let mut node = match &self.root {
            Some(r) => r.as_ref(),
            None => return 0,
        };
        let mut levels = 1;
        while !node.leaf {
            levels += 1;
            node = &node.children[0];
        }
        levels
    }

    /// Search method for BTree
    ///
    /// Returns true if value is present, false otherwise
    pub fn search(&self, value: &T) -> bool {
        let mut node = match &self.root {
            Some(r) => r.as_ref(),
            None => return false,
        };

        // Descend iteratively; each node's search tells us either where the
        // value sits or which child it would be under.
        loop {
            let (found, idx) = node.search(value);
            if found {
                return true;
            }
            if node.leaf {
                return false;
            }
            node = &node.children[idx];
        }
    }

    /// Inserts a value into the b-tree
    ///
    /// A value that is already present is ignored, so the keys stored in the
    /// tree stay unique.
    pub fn insert(&mut self, value: T) {
        if self.search(&value) {
            return;
        }

        match &mut self.root {
            Some(root) => {
                if root.keys.len() < 2 * self.degree - 1 {
                    root.insert_non_full(value);
                } else {
                    // Full root: allocate a new root above it and split the
                    // old one, the only way the tree gains a level.
                    let old_root = self.root.take().expect("root must exist in Some branch");
                    let mut new_root = Node::new(self.degree, false);
                    new_root.children.push(old_root);
                    new_root.split_child(0);
                    new_root.insert_non_full(value);
                    self.root = Some(Box::new(new_root));
                }
            }
            None => {
                let mut root = Node::new(self.degree, true);
                root.keys.push(value);
                self.root = Some(Box::new(root));
            }
        }
    }

    /// Deletes a value from the b-tree
    ///
    /// Deleting a value that is not present (including from an empty tree)
    /// leaves the tree untouched.
    pub fn delete(&mut self, value: &T) {
        let root = match &mut self.root {
            Some(r) => r.as_mut(),
            None => return,
        };

        root.delete(value);

        // The root is the one node allowed to underflow; once it runs out of
        // keys the tree either loses a level or becomes empty.
        if root.keys.is_empty() {
            let mut old_root = self.root.take().expect("root must exist after delete");
            self.root = if old_root.leaf {
                None
            } else {
                Some(old_root.children.remove(0))
            };
        }
    }

    /// Traverse method for BTree
    ///
    /// Prints every key in sorted order on a single line.
    pub fn traverse(&self) {
        match &self.root {
            Some(r) => {
                r.traverse();
                println!();
            }
            None => println!("=== EMPTY BTREE ==="),
        }
    }

    /// Prints the tree one node per line, indented by depth.
    ///
    /// Diagnostic output only; the layout of the dump is not a stable
    /// interface.
    pub fn print_structure(&self) {
        match &self.root {
            Some(r) => {
                println!("=== BTree Structure (min degree {}) ===", self.degree);
                r.print_structure(0);
            }
            None => println!("Empty tree"),
        }
    }
}

impl<T: Ord + Debug + Clone> Node<T> {
    fn new(degree: usize, leaf: bool) -> Self {
        Node {
            keys: Vec::with_capacity(2 * degree - 1),
            children: Vec::with_capacity(2 * degree),
            leaf,
            degree,
        }
    }

    /// Binary search over the sorted keys
    ///
    /// Returns true and the key's index if value is present, otherwise false
    /// and the index of the child the value would descend into (equally, the
    /// value's insertion point among the keys).
    fn search(&self, value: &T) -> (bool, usize) {
        let mut left = 0;
        let mut right = self.keys.len();

        // Range is [left, right) - left inclusive, right exclusive
        while left < right {
            let mid = left + (right - left) / 2;
            if self.keys[mid] == *value {
                return (true, mid);
            }
            if self.keys[mid] < *value {
                left = mid + 1;
            } else {
                right = mid;
            }
        }

        (false, left)
    }

    /// Inserts a value into the subtree rooted at this node (called
    /// recursively)
    ///
    /// The node must be non-full when the function is called; full children
    /// are split before descending, so the guarantee holds all the way down.
    fn insert_non_full(&mut self, value: T) {
        let (_, mut idx) = self.search(&value);

        if self.leaf {
            self.keys.insert(idx, value);
        } else {
            if self.children[idx].keys.len() == 2 * self.degree - 1 {
                self.split_child(idx);
                // The promoted median now sits at idx; step right of it when
                // the value sorts above it.
                if value > self.keys[idx] {
                    idx += 1;
                }
            }
            self.children[idx].insert_non_full(value);
        }
    }

    /// Splits the full child at child_idx into two nodes of t-1 keys each,
    /// promoting its median key into this node
    ///
    /// The new right sibling takes the child's keys above the median and, for
    /// an internal child, the matching upper half of its children.
    fn split_child(&mut self, child_idx: usize) {
        let t = self.degree;
        let child = &mut self.children[child_idx];

        // Keys [t, 2t-1) move to the sibling; the median at t-1 is promoted.
        let right_keys = child.keys.split_off(t);
        let median = child.keys.pop().expect("full child missing its median key");
        let right_children = if child.leaf {
            Vec::new()
        } else {
            child.children.split_off(t)
        };

        let sibling = Node {
            keys: right_keys,
            children: right_children,
            leaf: child.leaf,
            degree: t,
        };

        self.keys.insert(child_idx, median);
        self.children.insert(child_idx + 1, Box::new(sibling));
    }

    /// Deletes a value from the subtree rooted at this node (recursively)
    ///
    /// Callers guarantee the node has at least t keys unless it is the root,
    /// so removing one key can never underflow it. The same guarantee is
    /// re-established for a child before descending into it.
    fn delete(&mut self, value: &T) {
        let t = self.degree;
        let (found, idx) = self.search(value);

        if found {
            if self.leaf {
                // Case 1: the value sits in a leaf, splice it out in place.
                self.keys.remove(idx);
            } else {
                // Case 2: the value sits in an internal node.
                self.delete_from_internal(idx);
            }
        } else {
            if self.leaf {
                // Bottomed out without finding the value, nothing to delete.
                return;
            }

            // Case 3: the value belongs under children[idx]. Refill that
            // child first if it is too thin to give up a key.
            if self.children[idx].keys.len() < t {
                self.fill_child(idx);
            }

            // A merge inside fill_child can remove the last child, in which
            // case the value now lives in the merged node one slot left.
            if idx > self.keys.len() {
                self.children[idx - 1].delete(value);
            } else {
                self.children[idx].delete(value);
            }
        }
    }

    /// Deletes keys[idx] from this internal node, pulling a replacement from
    /// whichever adjacent subtree can afford to lose a key and merging the
    /// two when neither can
    fn delete_from_internal(&mut self, idx: usize) {
        let t = self.degree;

        if self.children[idx].keys.len() >= t {
            // Replace with the predecessor out of the left subtree, then
            // delete the predecessor from it.
            let pred = self.children[idx].rightmost_key().clone();
            self.children[idx].delete(&pred);
            self.keys[idx] = pred;
        } else if self.children[idx + 1].keys.len() >= t {
            // Replace with the successor out of the right subtree.
            let succ = self.children[idx + 1].leftmost_key().clone();
            self.children[idx + 1].delete(&succ);
            self.keys[idx] = succ;
        } else {
            // Both subtrees sit at t-1 keys: merge them around the value,
            // then delete the value from the merged node.
            let value = self.keys[idx].clone();
            self.merge_children(idx);
            self.children[idx].delete(&value);
        }
    }

    /// Largest key in the subtree rooted at this node.
    fn rightmost_key(&self) -> &T {
        let mut node = self;
        while !node.leaf {
            node = node.children.last().expect("internal node missing children");
        }
        node.keys.last().expect("node missing keys")
    }

    /// Smallest key in the subtree rooted at this node.
    fn leftmost_key(&self) -> &T {
        let mut node = self;
        while !node.leaf {
            node = node.children.first().expect("internal node missing children");
        }
        node.keys.first().expect("node missing keys")
    }

    /// Brings children[child_idx] up to at least t keys so a deletion can
    /// safely descend through it
    ///
    /// Borrows through the parent from a sibling that has keys to spare,
    /// merging with one when neither does.
    fn fill_child(&mut self, child_idx: usize) {
        let t = self.degree;

        if child_idx > 0 && self.children[child_idx - 1].keys.len() >= t {
            self.borrow_from_left(child_idx);
        } else if child_idx + 1 < self.children.len()
            && self.children[child_idx + 1].keys.len() >= t
        {
            self.borrow_from_right(child_idx);
        } else if child_idx < self.keys.len() {
            // Right sibling exists, merge with it.
            self.merge_children(child_idx);
        } else {
            // child_idx is the last child, merge with the left sibling.
            self.merge_children(child_idx - 1);
        }
    }

    /// Moves the separator key down to the front of children[child_idx] and
    /// the left sibling's greatest key up to replace it
    fn borrow_from_left(&mut self, child_idx: usize) {
        let last_key = self.children[child_idx - 1]
            .keys
            .pop()
            .expect("left sibling has no keys");
        let separator = mem::replace(&mut self.keys[child_idx - 1], last_key);
        self.children[child_idx].keys.insert(0, separator);

        // An internal sibling hands over its last child along with the key.
        if !self.children[child_idx - 1].leaf {
            let last_child = self.children[child_idx - 1]
                .children
                .pop()
                .expect("left sibling has no children");
            self.children[child_idx].children.insert(0, last_child);
        }
    }

    /// Moves the separator key down to the back of children[child_idx] and
    /// the right sibling's least key up to replace it
    fn borrow_from_right(&mut self, child_idx: usize) {
        let first_key = self.children[child_idx + 1].keys.remove(0);
        let separator = mem::replace(&mut self.keys[child_idx], first_key);
        self.children[child_idx].keys.push(separator);

        if !self.children[child_idx + 1].leaf {
            let first_child = self.children[child_idx + 1].children.remove(0);
            self.children[child_idx].children.push(first_child);
        }
    }

    /// Merges children[child_idx], the separator key at child_idx, and
    /// children[child_idx + 1] into the left child's storage
    ///
    /// Shrinks this node by one key and one child; callers account for the
    /// index shift that causes.
    fn merge_children(&mut self, child_idx: usize) {
        let separator = self.keys.remove(child_idx);
        let mut right = self.children.remove(child_idx + 1);

        let left = &mut self.children[child_idx];
        left.keys.push(separator);
        left.keys.append(&mut right.keys);
        if !left.leaf {
            left.children.append(&mut right.children);
        }
        // The right sibling's box drops here; it is no longer reachable.
    }

    /// Prints the keys of this subtree in sorted order.
    fn traverse(&self) {
        for i in 0..self.keys.len() {
            if !self.leaf {
                self.children[i].traverse();
            }
            print!("{:?} ", self.keys[i]);
        }
        if !self.leaf {
            self.children[self.keys.len()].traverse();
        }
    }

    fn print_structure(&self, depth: usize) {
        let indent = "  ".repeat(depth);
        println!("{}Node (leaf={}): {:?}", indent, self.leaf, self.keys);

        for child in &self.children {
            child.print_structure(depth + 1);
        }
    }
}
