//! Order maintenance for assembly edits.
//!
//! [`AssemblyTree`] keeps a sequence of ATUs in an implicit treap: nodes are
//! ordered by position, and each subtree knows how many bins it covers, so
//! the sequence can be cut at any bin. Reversing a range toggles a lazy flag
//! on one subtree; the flag is pushed down only when a cut passes through.

use crate::libs::atu::{self, Atu};
use crate::libs::error::{HictError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// NodeId is an index into the tree's node vector.
type NodeId = usize;

#[derive(Debug, Clone)]
struct Node {
    atu: Atu,
    priority: u64,
    left: Option<NodeId>,
    right: Option<NodeId>,
    /// Bins covered by this subtree
    bins: u64,
    /// ATUs in this subtree
    count: usize,
    /// The whole subtree, this node included, still has to be flipped
    flipped: bool,
}

#[derive(Debug, Clone)]
pub struct AssemblyTree {
    /// Arena storage; cut ATUs allocate new nodes and nothing is freed
    nodes: Vec<Node>,
    root: Option<NodeId>,
    rng: StdRng,
}

impl Default for AssemblyTree {
    fn default() -> Self {
        Self::new()
    }
}

impl AssemblyTree {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            rng: StdRng::seed_from_u64(0x4849_4354),
        }
    }

    pub fn from_atus(atus: impl IntoIterator<Item = Atu>) -> Self {
        let mut tree = Self::new();
        for atu in atus {
            tree.push(atu);
        }
        tree
    }

    /// Append an ATU at the end of the assembly
    pub fn push(&mut self, atu: Atu) {
        let id = self.alloc(atu);
        self.root = self.join(self.root, Some(id));
    }

    pub fn total_bins(&self) -> u64 {
        self.bins(self.root)
    }

    pub fn atu_count(&self) -> usize {
        self.root.map_or(0, |id| self.nodes[id].count)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// ATUs in assembly order with pending flips applied
    pub fn atus(&self) -> Vec<Atu> {
        let mut out = Vec::with_capacity(self.atu_count());
        self.collect(self.root, false, &mut out);
        out
    }

    /// The canonical form of the current order, [`atu::reduce`] over [`atus`].
    ///
    /// `merge` joins touching ranges in either order, so neighbours such as
    /// `1(+):5-10, 1(+):0-5` collapse to `1(+):0-10`. The result then reads
    /// the bins in a different order than [`atus`] does.
    ///
    /// [`atus`]: AssemblyTree::atus
    pub fn assembly_order(&self) -> Vec<Atu> {
        atu::reduce(&self.atus())
    }

    /// Reverse bins `[start, end)`: their order and every orientation flip.
    pub fn reverse_range(&mut self, start: u64, end: u64) -> Result<()> {
        self.check_range(start, end)?;

        let (rest, right) = self.split(self.root, end);
        let (left, middle) = self.split(rest, start);
        if let Some(id) = middle {
            self.nodes[id].flipped ^= true;
        }
        let rest = self.join(left, middle);
        self.root = self.join(rest, right);
        Ok(())
    }

    /// Cut bins `[start, end)` and re-insert them so they begin at bin
    /// `target` of the remaining sequence.
    pub fn move_range(&mut self, start: u64, end: u64, target: u64) -> Result<()> {
        self.check_range(start, end)?;
        let remaining = self.total_bins() - (end - start);
        if target > remaining {
            return Err(HictError::RangeOutOfBounds {
                start: target,
                end: target + (end - start),
                total: self.total_bins(),
            });
        }

        let (rest, right) = self.split(self.root, end);
        let (left, middle) = self.split(rest, start);
        let others = self.join(left, right);

        let (before, after) = self.split(others, target);
        let head = self.join(before, middle);
        self.root = self.join(head, after);
        Ok(())
    }

    fn check_range(&self, start: u64, end: u64) -> Result<()> {
        let total = self.total_bins();
        if start >= end || end > total {
            return Err(HictError::RangeOutOfBounds { start, end, total });
        }
        Ok(())
    }

    fn alloc(&mut self, atu: Atu) -> NodeId {
        let id = self.nodes.len();
        let priority = self.rng.gen();
        self.nodes.push(Node {
            atu,
            priority,
            left: None,
            right: None,
            bins: atu.length(),
            count: 1,
            flipped: false,
        });
        id
    }

    fn bins(&self, id: Option<NodeId>) -> u64 {
        id.map_or(0, |id| self.nodes[id].bins)
    }

    fn count(&self, id: Option<NodeId>) -> usize {
        id.map_or(0, |id| self.nodes[id].count)
    }

    fn update(&mut self, id: NodeId) {
        let (left, right) = (self.nodes[id].left, self.nodes[id].right);
        let bins = self.bins(left) + self.bins(right) + self.nodes[id].atu.length();
        let count = self.count(left) + self.count(right) + 1;
        let node = &mut self.nodes[id];
        node.bins = bins;
        node.count = count;
    }

    fn push_down(&mut self, id: NodeId) {
        if !self.nodes[id].flipped {
            return;
        }
        let node = &mut self.nodes[id];
        node.flipped = false;
        std::mem::swap(&mut node.left, &mut node.right);
        node.atu = node.atu.reversed();
        let (left, right) = (node.left, node.right);
        for child in [left, right].into_iter().flatten() {
            self.nodes[child].flipped ^= true;
        }
    }

    /// Split into the first `pos` bins and the rest, cutting an ATU if needed
    fn split(&mut self, id: Option<NodeId>, pos: u64) -> (Option<NodeId>, Option<NodeId>) {
        let Some(id) = id else {
            return (None, None);
        };
        self.push_down(id);

        let left_bins = self.bins(self.nodes[id].left);
        let own = self.nodes[id].atu.length();

        if pos <= left_bins {
            let (l, r) = self.split(self.nodes[id].left, pos);
            self.nodes[id].left = r;
            self.update(id);
            (l, Some(id))
        } else if pos >= left_bins + own {
            let (l, r) = self.split(self.nodes[id].right, pos - left_bins - own);
            self.nodes[id].right = l;
            self.update(id);
            (Some(id), r)
        } else {
            let (head, tail) = match self.nodes[id].atu.split_at(pos - left_bins) {
                Some(pieces) => pieces,
                None => unreachable!("cut strictly inside an ATU"),
            };
            self.nodes[id].atu = head;
            let right = self.nodes[id].right.take();
            self.update(id);

            let tail_id = self.alloc(tail);
            let rest = self.join(Some(tail_id), right);
            (Some(id), rest)
        }
    }

    fn join(&mut self, a: Option<NodeId>, b: Option<NodeId>) -> Option<NodeId> {
        match (a, b) {
            (None, b) => b,
            (a, None) => a,
            (Some(a), Some(b)) => {
                if self.nodes[a].priority > self.nodes[b].priority {
                    self.push_down(a);
                    let joined = self.join(self.nodes[a].right, Some(b));
                    self.nodes[a].right = joined;
                    self.update(a);
                    Some(a)
                } else {
                    self.push_down(b);
                    let joined = self.join(Some(a), self.nodes[b].left);
                    self.nodes[b].left = joined;
                    self.update(b);
                    Some(b)
                }
            }
        }
    }

    fn collect(&self, id: Option<NodeId>, flip: bool, out: &mut Vec<Atu>) {
        let Some(id) = id else {
            return;
        };
        let node = &self.nodes[id];
        let flip = flip ^ node.flipped;
        if flip {
            self.collect(node.right, flip, out);
            out.push(node.atu.reversed());
            self.collect(node.left, flip, out);
        } else {
            self.collect(node.left, flip, out);
            out.push(node.atu);
            self.collect(node.right, flip, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::atu::Direction;
    use rand::rngs::SmallRng;

    fn fwd(stripe: u64, start: u64, end: u64) -> Atu {
        Atu::new(stripe, start, end, Direction::Forward).unwrap()
    }

    fn rev(stripe: u64, start: u64, end: u64) -> Atu {
        Atu::new(stripe, start, end, Direction::Reverse).unwrap()
    }

    // bin-by-bin reading of a sequence, as (stripe, bin)
    fn expand(atus: &[Atu]) -> Vec<(u64, u64)> {
        let mut bins = vec![];
        for atu in atus {
            match atu.direction() {
                Direction::Forward => {
                    bins.extend((atu.start()..atu.end()).map(|b| (atu.stripe(), b)))
                }
                Direction::Reverse => bins.extend(
                    (atu.start()..atu.end())
                        .rev()
                        .map(|b| (atu.stripe(), b)),
                ),
            }
        }
        bins
    }

    #[test]
    fn test_build() {
        let tree = AssemblyTree::from_atus(vec![fwd(1, 0, 5), fwd(1, 5, 10), fwd(2, 0, 3)]);
        assert_eq!(tree.total_bins(), 13);
        assert_eq!(tree.atu_count(), 3);
        assert_eq!(tree.assembly_order(), vec![fwd(1, 0, 10), fwd(2, 0, 3)]);

        let empty = AssemblyTree::new();
        assert!(empty.is_empty());
        assert!(empty.atus().is_empty());
    }

    #[test]
    fn test_reverse_whole_atu() {
        let mut tree = AssemblyTree::from_atus(vec![fwd(1, 0, 10), fwd(2, 0, 3)]);
        tree.reverse_range(10, 13).unwrap();
        assert_eq!(tree.atus(), vec![fwd(1, 0, 10), rev(2, 0, 3)]);

        // reversing twice restores the order
        tree.reverse_range(10, 13).unwrap();
        assert_eq!(tree.atus(), vec![fwd(1, 0, 10), fwd(2, 0, 3)]);
    }

    #[test]
    fn test_reverse_cuts_atus() {
        let mut tree = AssemblyTree::from_atus(vec![fwd(1, 0, 10), fwd(2, 0, 4)]);
        // bins 8..12 span the end of stripe 1 and the start of stripe 2
        tree.reverse_range(8, 12).unwrap();
        assert_eq!(
            tree.atus(),
            vec![fwd(1, 0, 8), rev(2, 0, 2), rev(1, 8, 10), fwd(2, 2, 4)]
        );
        assert_eq!(tree.total_bins(), 14);

        tree.reverse_range(8, 12).unwrap();
        assert_eq!(tree.assembly_order(), vec![fwd(1, 0, 10), fwd(2, 0, 4)]);
    }

    #[test]
    fn test_move_range() {
        let mut tree = AssemblyTree::from_atus(vec![fwd(1, 0, 5), fwd(2, 0, 5), fwd(3, 0, 5)]);
        // move stripe 3 to the front
        tree.move_range(10, 15, 0).unwrap();
        assert_eq!(tree.atus(), vec![fwd(3, 0, 5), fwd(1, 0, 5), fwd(2, 0, 5)]);

        // move the middle of stripe 3 to the very end
        tree.move_range(1, 3, 13).unwrap();
        assert_eq!(
            tree.atus(),
            vec![fwd(3, 0, 1), fwd(3, 3, 5), fwd(1, 0, 5), fwd(2, 0, 5), fwd(3, 1, 3)]
        );
        assert_eq!(tree.total_bins(), 15);
    }

    #[test]
    fn test_order_merges_swapped_neighbours() {
        let mut tree = AssemblyTree::from_atus(vec![fwd(1, 0, 10)]);
        tree.move_range(5, 10, 0).unwrap();
        assert_eq!(tree.atus(), vec![fwd(1, 5, 10), fwd(1, 0, 5)]);
        assert_eq!(tree.assembly_order(), vec![fwd(1, 0, 10)]);
        assert_ne!(expand(&tree.assembly_order()), expand(&tree.atus()));
    }

    #[test]
    fn test_bad_ranges() {
        let mut tree = AssemblyTree::from_atus(vec![fwd(1, 0, 5)]);
        assert!(matches!(
            tree.reverse_range(2, 6),
            Err(HictError::RangeOutOfBounds { total: 5, .. })
        ));
        assert!(tree.reverse_range(3, 3).is_err());
        assert!(tree.move_range(0, 2, 4).is_err());
        assert!(tree.move_range(0, 2, 3).is_ok());
    }

    #[test]
    fn test_random_edits_match_naive() {
        let mut rng = SmallRng::seed_from_u64(11);
        let initial = vec![fwd(0, 0, 7), rev(1, 2, 9), fwd(2, 0, 4), fwd(0, 7, 12)];
        let mut tree = AssemblyTree::from_atus(initial.clone());
        let mut naive = expand(&initial);
        let total = naive.len() as u64;

        for _ in 0..300 {
            let start = rng.gen_range(0..total);
            let end = rng.gen_range(start + 1..=total);
            if rng.gen_bool(0.5) {
                tree.reverse_range(start, end).unwrap();
                naive[start as usize..end as usize].reverse();
            } else {
                let target = rng.gen_range(0..=total - (end - start));
                tree.move_range(start, end, target).unwrap();
                let moved: Vec<_> = naive.drain(start as usize..end as usize).collect();
                let tail = naive.split_off(target as usize);
                naive.extend(moved);
                naive.extend(tail);
            }

            assert_eq!(tree.total_bins(), total);
            assert_eq!(expand(&tree.atus()), naive);
        }
    }
}
