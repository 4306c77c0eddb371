//! A treap keyed implicitly by in-order position. Each subtree caches its
//! size, sum, endpoint values and whether its run is sorted, and defers
//! whole-subtree add, assign and reverse transformations as lazy tags. The
//! sorted-run flags are what make the permutation steps logarithmic: they let
//! the pivot search skip entire subtrees.

use std::fmt::{Debug, Formatter};

use debug_tree::{add_branch_to, add_leaf_to, AsTree, TreeBuilder};
use derivative::Derivative;
use rand::{rngs, Rng, SeedableRng};

use super::Sequence;

type Idx = usize;

/// Index used for a missing child.
const EMPTY: Idx = usize::MAX;

const DEFAULT_SEED: u64 = 2718281828;

fn idx_fmt(u: &Idx, f: &mut Formatter) -> std::fmt::Result {
    if *u == EMPTY {
        write!(f, "∅")
    } else {
        write!(f, "{u}")
    }
}
fn idx2_fmt([u, v]: &[Idx; 2], f: &mut Formatter) -> std::fmt::Result {
    write!(f, "[")?;
    idx_fmt(u, f)?;
    write!(f, ", ")?;
    idx_fmt(v, f)?;
    write!(f, "]")
}

#[derive(Derivative)]
#[derivative(Debug)]
struct Node {
    value: i64,
    /// Sum of all values in this subtree.
    sum: i64,
    /// Values at the leftmost and rightmost in-order positions of this subtree.
    left_val: i64,
    right_val: i64,
    /// The in-order run of this subtree is non-decreasing / non-increasing.
    ascending: bool,
    descending: bool,
    /// Deferred addend for every value in this subtree.
    add: i64,
    /// Deferred overwrite for every value in this subtree.
    assign: Option<i64>,
    /// This node's children and direction-sensitive data should be flipped.
    rev: bool,
    size: usize,
    /// Left and right child
    #[derivative(Debug(format_with = "idx2_fmt"))]
    child: [Idx; 2],
    #[derivative(Debug = "ignore")]
    priority: u32,
}

impl Node {
    fn new(value: i64, priority: u32) -> Self {
        Self {
            value,
            sum: value,
            left_val: value,
            right_val: value,
            ascending: true,
            descending: true,
            add: 0,
            assign: None,
            rev: false,
            size: 1,
            child: [EMPTY; 2],
            priority,
        }
    }
}

/// Sequence engine backed by an implicit-key treap. Nodes live in an arena
/// indexed by `Idx`; the engine holds the root index. Dropping the engine
/// drops the arena, so teardown never recurses.
pub struct TreapSeq {
    nodes: Vec<Node>,
    /// Arena slots released by `remove`, reused before growing.
    free: Vec<Idx>,
    root: Idx,
    rng: rngs::StdRng,
}

impl Debug for TreapSeq {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let builder = TreeBuilder::new();
        add_branch_to!(builder, "TreapSeq");
        if self.root != EMPTY {
            self.tree_dbg(self.root, &builder);
        }
        writeln!(f, "{}", builder.string())
    }
}

impl TreapSeq {
    /// New empty sequence drawing priorities from the given seed.
    pub fn with_seed(capacity: usize, seed: u64) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
            root: EMPTY,
            rng: rngs::StdRng::seed_from_u64(seed),
        }
    }

    fn tree_dbg<T: AsTree>(&self, u: Idx, tree: &T) {
        let nu = &self.nodes[u];
        add_branch_to!(*tree, "[{u}] {nu:?}");
        if nu.child == [EMPTY, EMPTY] {
            return;
        }
        for c in nu.child {
            if c != EMPTY {
                self.tree_dbg(c, tree);
            } else {
                add_leaf_to!(*tree, "<no edge>");
            }
        }
    }

    fn n(&self, u: Idx) -> Option<&Node> {
        if u == EMPTY {
            None
        } else {
            Some(&self.nodes[u])
        }
    }
    fn size(&self, u: Idx) -> usize {
        self.n(u).map_or(0, |n| n.size)
    }
    fn sum_of(&self, u: Idx) -> i64 {
        self.n(u).map_or(0, |n| n.sum)
    }

    fn alloc(&mut self, value: i64) -> Idx {
        let node = Node::new(value, self.rng.gen());
        match self.free.pop() {
            Some(u) => {
                self.nodes[u] = node;
                u
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    /// Returns every node of the subtree to the free list.
    fn release(&mut self, u: Idx) {
        if u == EMPTY {
            return;
        }
        let [l, r] = self.nodes[u].child;
        self.release(l);
        self.release(r);
        self.free.push(u);
    }

    /// Install an assign tag on the root of a subtree. Makes the run uniform,
    /// so any in-flight reverse becomes the identity and is dropped.
    fn apply_assign(&mut self, u: Idx, value: i64) {
        let n = &mut self.nodes[u];
        n.assign = Some(value);
        n.add = 0;
        n.rev = false;
        n.value = value;
        n.left_val = value;
        n.right_val = value;
        n.sum = value * n.size as i64;
        n.ascending = true;
        n.descending = true;
    }

    /// Install an add tag on the root of a subtree. Translation preserves
    /// order, so the sorted-run flags stay as they are.
    fn apply_add(&mut self, u: Idx, delta: i64) {
        let n = &mut self.nodes[u];
        n.add += delta;
        n.value += delta;
        n.left_val += delta;
        n.right_val += delta;
        n.sum += n.size as i64 * delta;
    }

    fn toggle_rev(&mut self, u: Idx) {
        if u != EMPTY {
            self.nodes[u].rev ^= true;
        }
    }

    fn push_rev(&mut self, u: Idx) {
        if !self.nodes[u].rev {
            return;
        }
        let n = &mut self.nodes[u];
        n.rev = false;
        n.child.swap(0, 1);
        std::mem::swap(&mut n.left_val, &mut n.right_val);
        std::mem::swap(&mut n.ascending, &mut n.descending);
        let child = n.child;
        for c in child {
            if c != EMPTY {
                self.nodes[c].rev ^= true;
            }
        }
    }

    fn push_assign(&mut self, u: Idx) {
        if let Some(value) = self.nodes[u].assign.take() {
            let child = self.nodes[u].child;
            for c in child {
                if c != EMPTY {
                    self.apply_assign(c, value);
                }
            }
        }
    }

    fn push_add(&mut self, u: Idx) {
        let delta = std::mem::take(&mut self.nodes[u].add);
        if delta != 0 {
            let child = self.nodes[u].child;
            for c in child {
                if c != EMPTY {
                    self.apply_add(c, delta);
                }
            }
        }
    }

    /// Propagate pending tags to the children and clear them here. Reverse
    /// must go first: it decides which child is which before assign and add
    /// land on them.
    fn push(&mut self, u: Idx) {
        if u == EMPTY {
            return;
        }
        self.push_rev(u);
        self.push_assign(u);
        self.push_add(u);
    }

    /// Recompute cached aggregates from the children. The children are pushed
    /// first so their cached fields are current.
    fn pull(&mut self, u: Idx) {
        if u == EMPTY {
            return;
        }
        let [l, r] = self.nodes[u].child;
        self.push(l);
        self.push(r);
        let value = self.nodes[u].value;
        let mut size = 1;
        let mut sum = value;
        let mut ascending = true;
        let mut descending = true;
        let mut left_val = value;
        let mut right_val = value;
        if let Some(ln) = self.n(l) {
            size += ln.size;
            sum += ln.sum;
            ascending &= ln.ascending && ln.right_val <= value;
            descending &= ln.descending && ln.right_val >= value;
            left_val = ln.left_val;
        }
        if let Some(rn) = self.n(r) {
            size += rn.size;
            sum += rn.sum;
            ascending &= rn.ascending && rn.left_val >= value;
            descending &= rn.descending && rn.left_val <= value;
            right_val = rn.right_val;
        }
        let n = &mut self.nodes[u];
        n.size = size;
        n.sum = sum;
        n.ascending = ascending;
        n.descending = descending;
        n.left_val = left_val;
        n.right_val = right_val;
    }

    /// In-order of the result is `l` followed by `r`.
    fn merge(&mut self, l: Idx, r: Idx) -> Idx {
        if l == EMPTY {
            return r;
        }
        if r == EMPTY {
            return l;
        }
        self.push(l);
        self.push(r);
        if self.nodes[l].priority > self.nodes[r].priority {
            let lr = self.nodes[l].child[1];
            let new_r = self.merge(lr, r);
            self.nodes[l].child[1] = new_r;
            self.pull(l);
            l
        } else {
            let rl = self.nodes[r].child[0];
            let new_l = self.merge(l, rl);
            self.nodes[r].child[0] = new_l;
            self.pull(r);
            r
        }
    }

    /// (First k, rest)
    fn split_at(&mut self, t: Idx, k: usize) -> (Idx, Idx) {
        if t == EMPTY {
            return (EMPTY, EMPTY);
        }
        self.push(t);
        let [l, r] = self.nodes[t].child;
        let szl = self.size(l);
        if k <= szl {
            let (a, b) = self.split_at(l, k);
            self.nodes[t].child[0] = b;
            self.pull(t);
            (a, t)
        } else {
            let (a, b) = self.split_at(r, k - szl - 1);
            self.nodes[t].child[1] = a;
            self.pull(t);
            (t, b)
        }
    }

    /// Splits a subtree whose run is known to be non-decreasing. Values below
    /// `v` go left and values above go right; equal values go left iff
    /// `equal_left`. Only well-defined on a sorted run, which is what keeps
    /// the descent to a single spine.
    fn split_by_value(&mut self, t: Idx, v: i64, equal_left: bool) -> (Idx, Idx) {
        if t == EMPTY {
            return (EMPTY, EMPTY);
        }
        self.push(t);
        debug_assert!(
            self.nodes[t].ascending,
            "value split on an unsorted run: {self:?}"
        );
        let value = self.nodes[t].value;
        let goes_left = if equal_left { value <= v } else { value < v };
        if goes_left {
            let r = self.nodes[t].child[1];
            let (a, b) = self.split_by_value(r, v, equal_left);
            self.nodes[t].child[1] = a;
            self.pull(t);
            (t, b)
        } else {
            let l = self.nodes[t].child[0];
            let (a, b) = self.split_by_value(l, v, equal_left);
            self.nodes[t].child[0] = b;
            self.pull(t);
            (a, t)
        }
    }

    /// Isolate positions `l..=r`, hand the fragment to `f`, and splice the
    /// subtree `f` returns back in. Every range operation goes through here.
    fn with_range<R>(&mut self, l: usize, r: usize, f: impl FnOnce(&mut Self, Idx) -> (Idx, R)) -> R {
        let root = self.root;
        let (mid, right) = self.split_at(root, r + 1);
        let (left, mid) = self.split_at(mid, l);
        let (mid, out) = f(self, mid);
        let lm = self.merge(left, mid);
        self.root = self.merge(lm, right);
        out
    }

    fn assert_range(&self, l: usize, r: usize) {
        assert!(
            l <= r && r < self.len(),
            "invalid range {l}..={r} for length {}",
            self.len()
        );
    }

    /// Number of leading elements of the subtree that are not part of its
    /// longest non-increasing (for `next`) or non-decreasing (for `prev`)
    /// suffix. At least 1 whenever the whole run is not already such a
    /// suffix, which the caller has ruled out.
    fn head_len(&mut self, t: Idx, next: bool) -> usize {
        if t == EMPTY {
            return 0;
        }
        self.push(t);
        let [l, r] = self.nodes[t].child;
        self.push(l);
        self.push(r);
        let value = self.nodes[t].value;
        if let Some(rn) = self.n(r) {
            let r_monotone = if next { rn.descending } else { rn.ascending };
            if !r_monotone {
                // The suffix starts somewhere inside the right subtree.
                return self.size(l) + 1 + self.head_len(r, next);
            }
            let junction_breaks = if next {
                value < rn.left_val
            } else {
                value > rn.left_val
            };
            if junction_breaks {
                // The suffix is exactly the right subtree.
                return self.size(l) + 1;
            }
        }
        if let Some(ln) = self.n(l) {
            let boundary_breaks = if next {
                ln.right_val < value
            } else {
                ln.right_val > value
            };
            if boundary_breaks {
                // The suffix starts at this node.
                return self.size(l);
            }
        }
        self.head_len(l, next)
    }

    /// The classical next/prev permutation step on a detached fragment.
    /// Returns the root of the rearranged fragment.
    fn permute(&mut self, t: Idx, next: bool) -> Idx {
        self.push(t);
        let n = &self.nodes[t];
        let exhausted = if next { n.descending } else { n.ascending };
        if exhausted {
            // Already the last arrangement in this direction; wrap around to
            // the first one by reversing the whole run.
            self.toggle_rev(t);
            return t;
        }
        let head_len = self.head_len(t, next);
        let (head, tail) = self.split_at(t, head_len - 1);
        // The pivot is the element just before the monotone suffix.
        let (pivot, suffix) = self.split_at(tail, 1);
        if next {
            // The suffix is non-increasing; flip it so it can be split by value.
            self.toggle_rev(suffix);
        }
        let pivot_val = self.nodes[pivot].value;
        let (lo, hi) = self.split_by_value(suffix, pivot_val, next);
        if next {
            // Swap the pivot with the smallest value strictly above it, which
            // is the first element of `hi`; the suffix stays sorted ascending.
            let (near, hi_rest) = self.split_at(hi, 1);
            let a = self.merge(head, near);
            let b = self.merge(a, lo);
            let c = self.merge(b, pivot);
            self.merge(c, hi_rest)
        } else {
            // Swap the pivot with the largest value strictly below it, which
            // is the last element of `lo`, then restore the suffix to
            // non-increasing order.
            let lo_size = self.size(lo);
            let (lo_rest, near) = self.split_at(lo, lo_size - 1);
            self.toggle_rev(hi);
            self.toggle_rev(lo_rest);
            let a = self.merge(head, near);
            let b = self.merge(a, hi);
            let c = self.merge(b, pivot);
            self.merge(c, lo_rest)
        }
    }

    fn permute_range(&mut self, l: usize, r: usize, next: bool) {
        self.assert_range(l, r);
        if l == r {
            return;
        }
        self.with_range(l, r, |s, mid| (s.permute(mid, next), ()));
    }

    fn in_order(&mut self, u: Idx, out: &mut Vec<i64>) {
        if u == EMPTY {
            return;
        }
        self.push(u);
        let [l, r] = self.nodes[u].child;
        self.in_order(l, out);
        out.push(self.nodes[u].value);
        self.in_order(r, out);
    }

    /// Walks the whole tree and checks the heap property plus every cached
    /// aggregate against values recomputed from a clean traversal. Test
    /// support; linear time.
    pub fn check_invariants(&mut self) {
        let root = self.root;
        let mut values = Vec::with_capacity(self.len());
        self.check_subtree(root, &mut values);
        assert_eq!(values.len(), self.len());
    }

    fn check_subtree(&mut self, u: Idx, out: &mut Vec<i64>) {
        if u == EMPTY {
            return;
        }
        self.push(u);
        let [l, r] = self.nodes[u].child;
        for c in [l, r] {
            if c != EMPTY {
                assert!(
                    self.nodes[u].priority >= self.nodes[c].priority,
                    "heap order broken between {u} and {c}"
                );
            }
        }
        let start = out.len();
        self.check_subtree(l, out);
        out.push(self.nodes[u].value);
        self.check_subtree(r, out);
        let run = &out[start..];
        let n = &self.nodes[u];
        assert_eq!(n.size, run.len(), "size of {u}");
        assert_eq!(n.sum, run.iter().sum::<i64>(), "sum of {u}");
        assert_eq!(n.left_val, run[0], "left_val of {u}");
        assert_eq!(n.right_val, *run.last().unwrap(), "right_val of {u}");
        assert_eq!(
            n.ascending,
            run.windows(2).all(|w| w[0] <= w[1]),
            "ascending flag of {u}"
        );
        assert_eq!(
            n.descending,
            run.windows(2).all(|w| w[0] >= w[1]),
            "descending flag of {u}"
        );
    }
}

impl Sequence for TreapSeq {
    fn with_capacity(capacity: usize) -> Self {
        Self::with_seed(capacity, DEFAULT_SEED)
    }

    fn len(&self) -> usize {
        self.size(self.root)
    }

    fn insert(&mut self, pos: usize, value: i64) {
        assert!(
            pos <= self.len(),
            "insert position {pos} out of bounds for length {}",
            self.len()
        );
        log::trace!("insert {value} at {pos}");
        let u = self.alloc(value);
        let root = self.root;
        let (l, r) = self.split_at(root, pos);
        let lu = self.merge(l, u);
        self.root = self.merge(lu, r);
    }

    fn remove(&mut self, pos: usize) {
        assert!(
            pos < self.len(),
            "remove position {pos} out of bounds for length {}",
            self.len()
        );
        log::trace!("remove at {pos}");
        self.with_range(pos, pos, |s, mid| {
            s.release(mid);
            (EMPTY, ())
        });
    }

    fn sum(&mut self, l: usize, r: usize) -> i64 {
        self.assert_range(l, r);
        self.with_range(l, r, |s, mid| (mid, s.sum_of(mid)))
    }

    fn assign(&mut self, value: i64, l: usize, r: usize) {
        self.assert_range(l, r);
        log::trace!("assign {value} on {l}..={r}");
        self.with_range(l, r, |s, mid| {
            s.apply_assign(mid, value);
            (mid, ())
        });
    }

    fn add(&mut self, delta: i64, l: usize, r: usize) {
        self.assert_range(l, r);
        log::trace!("add {delta} on {l}..={r}");
        self.with_range(l, r, |s, mid| {
            s.apply_add(mid, delta);
            (mid, ())
        });
    }

    fn next_permutation(&mut self, l: usize, r: usize) {
        log::trace!("next_permutation {l}..={r}");
        self.permute_range(l, r, true);
    }

    fn prev_permutation(&mut self, l: usize, r: usize) {
        log::trace!("prev_permutation {l}..={r}");
        self.permute_range(l, r, false);
    }

    fn extract(&mut self) -> Vec<i64> {
        let mut out = Vec::with_capacity(self.len());
        let root = self.root;
        self.in_order(root, &mut out);
        out
    }
}
