//! Binary space-partition layout with an optional open-ended axis.
//!
//! Every insertion takes the first free node (pre-order, left first) that is large
//! enough, shrinks it to the placed rectangle and hangs the two leftover regions
//! below it: the smaller one on the left, so small pockets are filled before the
//! search spills into the large, possibly open-ended, remainder.
//!
//! ```
//! use spritify_core::layout::Layout;
//! use spritify_core::extent::Extent;
//!
//! let mut layout = Layout::new(Extent::Bounded(12), Extent::OpenEnded);
//! layout.insert(12, 2, "header").unwrap();
//! layout.insert(6, 4, "icon").unwrap();
//! layout.prune();
//! assert_eq!(layout.bounding(), (Extent::Bounded(12), Extent::Bounded(6)));
//! assert_eq!(layout.nodes().count(), 2);
//! ```

use crate::error::LayoutError;
use crate::extent::{Extent, PartitionAxis};
use crate::model::Rect;
use tracing::trace;

mod node;

pub use node::{LayoutNode, NodeId};

/// Rectangle layout tree. Nodes live in an arena; the root is index 0 and is never replaced.
#[derive(Debug, Clone)]
pub struct Layout<T> {
    nodes: Vec<LayoutNode<T>>,
    placed: Vec<NodeId>,
    extent: (Extent, Extent),
    axis: PartitionAxis,
    spacing: u32,
}

impl<T> Layout<T> {
    /// Creates a layout whose free space is `(0, 0, width, height)`.
    ///
    /// # Panics
    ///
    /// Panics if both `width` and `height` are [`Extent::OpenEnded`]; use
    /// [`Layout::try_new`] to get an error instead.
    pub fn new(width: impl Into<Extent>, height: impl Into<Extent>) -> Self {
        match Self::try_new(width, height) {
            Ok(layout) => layout,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn try_new(
        width: impl Into<Extent>,
        height: impl Into<Extent>,
    ) -> Result<Self, LayoutError> {
        let (width, height) = (width.into(), height.into());
        if width.is_open_ended() && height.is_open_ended() {
            return Err(LayoutError::Unbounded);
        }
        Ok(Self {
            nodes: vec![LayoutNode::vacant(0, 0, width, height)],
            placed: Vec::new(),
            extent: (width, height),
            axis: PartitionAxis::for_extent(width, height),
            spacing: 0,
        })
    }

    /// Keeps `gap` pixels free between neighbouring rectangles. Bin edges get no gap.
    pub fn with_spacing(mut self, gap: u32) -> Self {
        self.spacing = gap;
        self
    }

    pub fn axis(&self) -> PartitionAxis {
        self.axis
    }

    /// Construction extent (unrelated to the final bounding box).
    pub fn extent(&self) -> (Extent, Extent) {
        self.extent
    }

    pub fn spacing(&self) -> u32 {
        self.spacing
    }

    /// Number of placed rectangles.
    pub fn len(&self) -> usize {
        self.placed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    pub fn root(&self) -> &LayoutNode<T> {
        &self.nodes[NodeId::ROOT.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&LayoutNode<T>> {
        self.nodes.get(id.0)
    }

    /// Places a `width` x `height` rectangle carrying `item`.
    ///
    /// Fails without touching the tree if the rectangle is empty or no free node can hold it.
    pub fn insert(&mut self, width: u32, height: u32, item: T) -> Result<(), LayoutError> {
        if width == 0 || height == 0 {
            return Err(LayoutError::ZeroSized { width, height });
        }
        let target = self
            .find_free(width, height)
            .ok_or(LayoutError::OutOfSpace { width, height })?;
        let (below, beside) = self.split(target, width, height);

        let node = &mut self.nodes[target.0];
        node.allocated = true;
        node.width = Extent::Bounded(width);
        node.height = Extent::Bounded(height);
        node.item = Some(item);
        trace!(x = node.x, y = node.y, width, height, "placed rectangle");

        let (smaller, larger) = if below.area() < beside.area() {
            (below, beside)
        } else {
            (beside, below)
        };
        let left = self.attach(smaller);
        let right = self.attach(larger);
        let node = &mut self.nodes[target.0];
        node.left = left;
        node.right = right;
        self.placed.push(target);
        Ok(())
    }

    /// Drops every free subtree hanging off the tree. Idempotent.
    pub fn prune(&mut self) {
        let mut removed = 0usize;
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            let keep = |child: Option<NodeId>| child.filter(|c| self.nodes[c.0].allocated);
            let (left, right) = (keep(node.left), keep(node.right));
            removed += usize::from(left != node.left) + usize::from(right != node.right);

            let node = &mut self.nodes[id.0];
            node.left = left;
            node.right = right;
            stack.extend(right);
            stack.extend(left);
        }
        trace!(removed, "pruned free nodes");
    }

    /// Far corner of the smallest origin-anchored box containing every reachable node.
    ///
    /// Before [`prune`](Self::prune) free nodes count too, so an open-ended axis still
    /// reports [`Extent::OpenEnded`].
    pub fn bounding(&self) -> (Extent, Extent) {
        self.walk().fold(
            (Extent::Bounded(0), Extent::Bounded(0)),
            |(w, h), n| (w.max(n.width.offset(n.x)), h.max(n.height.offset(n.y))),
        )
    }

    /// Placed rectangles in insertion order. Calling it again restarts the sequence.
    pub fn nodes(&self) -> Nodes<'_, T> {
        Nodes {
            nodes: &self.nodes,
            order: self.placed.iter(),
        }
    }

    /// Pre-order walk over every reachable node, free or allocated.
    pub fn walk(&self) -> impl Iterator<Item = &LayoutNode<T>> + '_ {
        Walk::new(&self.nodes).map(|(_, n)| n)
    }

    fn find_free(&self, width: u32, height: u32) -> Option<NodeId> {
        // Free nodes are always leaves, so plain pre-order visits them left to right.
        Walk::new(&self.nodes)
            .find(|(_, n)| n.fits(width, height))
            .map(|(id, _)| id)
    }

    /// Free regions left below and beside a `width` x `height` rectangle placed at the
    /// top-left corner of `target`, computed from the target's pre-allocation extent.
    fn split(&self, target: NodeId, width: u32, height: u32) -> (LayoutNode<T>, LayoutNode<T>) {
        let n = &self.nodes[target.0];
        let step_w = width.saturating_add(self.spacing);
        let step_h = height.saturating_add(self.spacing);
        let below_y = n.y.saturating_add(step_h);
        let beside_x = n.x.saturating_add(step_w);
        let below_h = n.height.shrink(step_h);
        let beside_w = n.width.shrink(step_w);
        match self.axis {
            PartitionAxis::Y => (
                LayoutNode::vacant(n.x, below_y, n.width, below_h),
                LayoutNode::vacant(beside_x, n.y, beside_w, Extent::Bounded(height)),
            ),
            PartitionAxis::X => (
                LayoutNode::vacant(n.x, below_y, Extent::Bounded(width), below_h),
                LayoutNode::vacant(beside_x, n.y, beside_w, n.height),
            ),
        }
    }

    fn attach(&mut self, region: LayoutNode<T>) -> Option<NodeId> {
        if region.area().is_empty() {
            return None;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(region);
        Some(id)
    }
}

struct Walk<'a, T> {
    nodes: &'a [LayoutNode<T>],
    stack: Vec<NodeId>,
}

impl<'a, T> Walk<'a, T> {
    fn new(nodes: &'a [LayoutNode<T>]) -> Self {
        Self {
            nodes,
            stack: vec![NodeId::ROOT],
        }
    }
}

impl<'a, T> Iterator for Walk<'a, T> {
    type Item = (NodeId, &'a LayoutNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = &self.nodes[id.0];
        self.stack.extend(node.right);
        self.stack.extend(node.left);
        Some((id, node))
    }
}

/// A rectangle placed by [`Layout::insert`].
#[derive(Debug)]
pub struct PlacedRect<'a, T> {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub item: &'a T,
}

impl<T> Clone for PlacedRect<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PlacedRect<'_, T> {}

impl<T> PlacedRect<'_, T> {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Iterator returned by [`Layout::nodes`].
#[derive(Debug)]
pub struct Nodes<'a, T> {
    nodes: &'a [LayoutNode<T>],
    order: std::slice::Iter<'a, NodeId>,
}

impl<T> Clone for Nodes<'_, T> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes,
            order: self.order.clone(),
        }
    }
}

impl<'a, T> Iterator for Nodes<'a, T> {
    type Item = PlacedRect<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        for id in self.order.by_ref() {
            let node = &self.nodes[id.0];
            if let (Some(width), Some(height), Some(item)) =
                (node.width.bounded(), node.height.bounded(), node.item.as_ref())
            {
                return Some(PlacedRect {
                    x: node.x,
                    y: node.y,
                    width,
                    height,
                    item,
                });
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.order.len();
        (n, Some(n))
    }
}

// Every id in `placed` points at an allocated node, so none are skipped.
impl<T> ExactSizeIterator for Nodes<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn children<T>(layout: &Layout<T>, node: &LayoutNode<T>) -> Vec<(u32, u32, Extent, Extent)> {
        [node.left(), node.right()]
            .into_iter()
            .flatten()
            .filter_map(|id| layout.get(id))
            .map(|c| (c.x(), c.y(), c.width(), c.height()))
            .collect()
    }

    #[test]
    fn rejects_rectangle_larger_than_bin() {
        let mut layout = Layout::new(Extent::Bounded(10), Extent::Bounded(10));
        assert_eq!(
            layout.insert(12, 12, "fail"),
            Err(LayoutError::OutOfSpace {
                width: 12,
                height: 12
            })
        );
        assert!(layout.is_empty());
        assert!(!layout.root().is_allocated());
        assert_eq!(layout.root().width(), Extent::Bounded(10));
    }

    #[test]
    fn full_extent_rectangle_leaves_no_free_children() {
        let mut layout = Layout::new(Extent::Bounded(10), Extent::Bounded(10));
        layout.insert(10, 10, 1).unwrap();
        let root = layout.root();
        assert!(root.is_allocated());
        assert!(root.left().is_none());
        assert!(root.right().is_none());
        assert_eq!(layout.insert(1, 1, 2), Err(LayoutError::OutOfSpace { width: 1, height: 1 }));
    }

    #[test]
    fn zero_sized_rectangle_is_rejected_before_mutation() {
        let mut layout: Layout<u8> = Layout::new(Extent::Bounded(4), Extent::Bounded(4));
        assert_eq!(
            layout.insert(0, 3, 0),
            Err(LayoutError::ZeroSized { width: 0, height: 3 })
        );
        assert_eq!(layout.walk().count(), 1);
    }

    #[test]
    fn both_axes_open_is_rejected() {
        let res: Result<Layout<()>, _> = Layout::try_new(Extent::OpenEnded, Extent::OpenEnded);
        assert_eq!(res.unwrap_err(), LayoutError::Unbounded);
    }

    #[test]
    #[should_panic(expected = "open-ended")]
    fn new_panics_when_both_axes_open() {
        let _: Layout<()> = Layout::new(Extent::OpenEnded, Extent::OpenEnded);
    }

    #[test]
    fn vertical_growth_splits_full_width_below() {
        let mut layout = Layout::new(Extent::Bounded(12), Extent::OpenEnded);
        assert_eq!(layout.axis(), PartitionAxis::Y);
        layout.insert(8, 2, 'a').unwrap();
        // beside (4x2) is smaller than the open region below, so it goes left
        assert_eq!(
            children(&layout, layout.root()),
            vec![
                (8, 0, Extent::Bounded(4), Extent::Bounded(2)),
                (0, 2, Extent::Bounded(12), Extent::OpenEnded),
            ]
        );
    }

    #[test]
    fn horizontal_growth_splits_full_height_beside() {
        let mut layout = Layout::new(Extent::OpenEnded, Extent::Bounded(12));
        assert_eq!(layout.axis(), PartitionAxis::X);
        layout.insert(2, 8, 'a').unwrap();
        assert_eq!(
            children(&layout, layout.root()),
            vec![
                (0, 8, Extent::Bounded(2), Extent::Bounded(4)),
                (2, 0, Extent::OpenEnded, Extent::Bounded(12)),
            ]
        );
    }

    #[test]
    fn tied_areas_put_beside_region_left() {
        let mut layout = Layout::new(Extent::Bounded(6), Extent::Bounded(6));
        layout.insert(3, 4, ()).unwrap();
        // below 6x2 and beside 3x4 both cover 12
        assert_eq!(
            children(&layout, layout.root()),
            vec![
                (3, 0, Extent::Bounded(3), Extent::Bounded(4)),
                (0, 4, Extent::Bounded(6), Extent::Bounded(2)),
            ]
        );
    }

    #[test]
    fn smaller_region_goes_left() {
        let mut layout = Layout::new(Extent::Bounded(4), Extent::Bounded(4));
        layout.insert(2, 2, ()).unwrap();
        // beside 2x2 (4) beats below 4x2 (8)
        assert_eq!(
            children(&layout, layout.root())[0],
            (2, 0, Extent::Bounded(2), Extent::Bounded(2))
        );

        let mut layout = Layout::new(Extent::OpenEnded, Extent::Bounded(4));
        layout.insert(2, 2, ()).unwrap();
        // below 2x2 beats the open region beside
        assert_eq!(
            children(&layout, layout.root())[0],
            (0, 2, Extent::Bounded(2), Extent::Bounded(2))
        );
    }

    #[test]
    fn small_pockets_fill_before_open_region() {
        let mut layout = Layout::new(Extent::Bounded(12), Extent::OpenEnded);
        layout.insert(10, 4, 0).unwrap();
        layout.insert(2, 2, 1).unwrap();
        let placed: Vec<_> = layout.nodes().map(|p| (p.x, p.y)).collect();
        assert_eq!(placed, vec![(0, 0), (10, 0)]);
    }

    #[test]
    fn spacing_separates_neighbours_but_not_edges() {
        let mut layout = Layout::new(Extent::Bounded(10), Extent::OpenEnded).with_spacing(1);
        layout.insert(4, 4, 'a').unwrap();
        layout.insert(5, 4, 'b').unwrap();
        layout.insert(10, 2, 'c').unwrap();
        layout.prune();
        let placed: Vec<_> = layout.nodes().map(|p| (*p.item, p.x, p.y)).collect();
        assert_eq!(placed, vec![('a', 0, 0), ('b', 5, 0), ('c', 0, 5)]);
        assert_eq!(layout.bounding(), (Extent::Bounded(10), Extent::Bounded(7)));
    }

    #[test]
    fn spacing_can_exhaust_a_tight_bin() {
        let mut layout = Layout::new(Extent::Bounded(8), Extent::Bounded(4)).with_spacing(1);
        layout.insert(4, 4, 0).unwrap();
        assert!(layout.insert(4, 4, 1).is_err());
        layout.insert(3, 4, 2).unwrap();
    }

    #[test]
    fn bounding_before_prune_reports_open_axis() {
        let mut layout = Layout::new(Extent::Bounded(12), Extent::OpenEnded);
        layout.insert(3, 3, ()).unwrap();
        assert_eq!(layout.bounding(), (Extent::Bounded(12), Extent::OpenEnded));
        layout.prune();
        assert_eq!(layout.bounding(), (Extent::Bounded(3), Extent::Bounded(3)));
    }

    #[test]
    fn empty_layout_bounding_is_its_extent() {
        let layout: Layout<()> = Layout::new(Extent::Bounded(7), Extent::Bounded(5));
        assert_eq!(layout.bounding(), (Extent::Bounded(7), Extent::Bounded(5)));
        assert_eq!(layout.nodes().count(), 0);
    }

    #[test]
    fn nodes_is_restartable() {
        let mut layout = Layout::new(Extent::Bounded(6), Extent::Bounded(6));
        for i in 0..4 {
            layout.insert(3, 3, i).unwrap();
        }
        let first: Vec<_> = layout.nodes().map(|p| *p.item).collect();
        let second: Vec<_> = layout.nodes().map(|p| *p.item).collect();
        assert_eq!(first, vec![0, 1, 2, 3]);
        assert_eq!(first, second);
        let it = layout.nodes();
        assert_eq!(it.clone().count(), it.count());
    }
}
