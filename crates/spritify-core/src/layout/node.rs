use crate::extent::{Area, Extent};
use std::fmt;

/// Handle to a node inside a [`Layout`](super::Layout) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub(crate) const ROOT: NodeId = NodeId(0);

    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A rectangle of the partition tree: either free space or a placed item.
///
/// Once allocated, `width`/`height` describe the placed rectangle, not the free
/// region it was carved from.
#[derive(Debug, Clone)]
pub struct LayoutNode<T> {
    pub(crate) x: u32,
    pub(crate) y: u32,
    pub(crate) width: Extent,
    pub(crate) height: Extent,
    pub(crate) allocated: bool,
    pub(crate) item: Option<T>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
}

impl<T> LayoutNode<T> {
    pub(crate) fn vacant(x: u32, y: u32, width: Extent, height: Extent) -> Self {
        Self {
            x,
            y,
            width,
            height,
            allocated: false,
            item: None,
            left: None,
            right: None,
        }
    }

    pub fn x(&self) -> u32 {
        self.x
    }
    pub fn y(&self) -> u32 {
        self.y
    }
    pub fn width(&self) -> Extent {
        self.width
    }
    pub fn height(&self) -> Extent {
        self.height
    }
    pub fn is_allocated(&self) -> bool {
        self.allocated
    }
    pub fn item(&self) -> Option<&T> {
        self.item.as_ref()
    }
    pub fn left(&self) -> Option<NodeId> {
        self.left
    }
    pub fn right(&self) -> Option<NodeId> {
        self.right
    }

    #[inline]
    pub fn area(&self) -> Area {
        Area::of(self.width, self.height)
    }

    #[inline]
    pub(crate) fn fits(&self, width: u32, height: u32) -> bool {
        !self.allocated && self.width.fits(width) && self.height.fits(height)
    }
}

impl<T: fmt::Debug> fmt::Display for LayoutNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.item {
            Some(item) => write!(f, "[{item:?}]")?,
            None => f.write_str("[-]")?,
        }
        write!(
            f,
            " - ({}, {}) w={} h={}",
            self.x, self.y, self.width, self.height
        )
    }
}
