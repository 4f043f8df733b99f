use serde::{Deserialize, Serialize};
use std::fmt;

/// Length along one axis of a layout.
///
/// `OpenEnded` models an axis whose final size is only known once packing is done.
/// It orders after every bounded value, so no real rectangle dimension ever ties with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extent {
    Bounded(u32),
    OpenEnded,
}

impl Extent {
    #[inline]
    pub fn is_open_ended(&self) -> bool {
        matches!(self, Extent::OpenEnded)
    }

    /// The finite length, or `None` for an open-ended axis.
    #[inline]
    pub fn bounded(&self) -> Option<u32> {
        match *self {
            Extent::Bounded(v) => Some(v),
            Extent::OpenEnded => None,
        }
    }

    /// True if a rectangle side of length `len` fits within this extent.
    #[inline]
    pub fn fits(&self, len: u32) -> bool {
        *self >= Extent::Bounded(len)
    }

    /// Remaining extent after taking `len` off. Saturates at zero; open stays open.
    #[inline]
    pub fn shrink(&self, len: u32) -> Extent {
        match *self {
            Extent::Bounded(v) => Extent::Bounded(v.saturating_sub(len)),
            Extent::OpenEnded => Extent::OpenEnded,
        }
    }

    /// Far edge of a span starting at `base` with this extent.
    #[inline]
    pub fn offset(&self, base: u32) -> Extent {
        match *self {
            Extent::Bounded(v) => Extent::Bounded(base.saturating_add(v)),
            Extent::OpenEnded => Extent::OpenEnded,
        }
    }
}

impl From<u32> for Extent {
    fn from(v: u32) -> Self {
        Extent::Bounded(v)
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extent::Bounded(v) => write!(f, "{v}"),
            Extent::OpenEnded => f.write_str("open"),
        }
    }
}

/// Area spanned by two extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Area {
    Finite(u64),
    Unbounded,
}

impl Area {
    /// A zero side always yields `Finite(0)`, even against an open-ended side.
    pub fn of(width: Extent, height: Extent) -> Area {
        match (width, height) {
            (Extent::Bounded(0), _) | (_, Extent::Bounded(0)) => Area::Finite(0),
            (Extent::Bounded(w), Extent::Bounded(h)) => Area::Finite(w as u64 * h as u64),
            _ => Area::Unbounded,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Area::Finite(0))
    }
}

/// Axis left free-form for the lifetime of a layout; the other axis is the fixed bin side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionAxis {
    /// Width grows; rectangles are packed into columns of the locked height.
    X,
    /// Height grows; rectangles are packed into rows of the locked width.
    Y,
}

impl PartitionAxis {
    /// Picks the axis of the larger extent. Ties favour `Y`.
    pub fn for_extent(width: Extent, height: Extent) -> Self {
        if width > height {
            PartitionAxis::X
        } else {
            PartitionAxis::Y
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_ended_orders_after_every_bounded_value() {
        assert!(Extent::OpenEnded > Extent::Bounded(u32::MAX));
        assert!(Extent::Bounded(3) < Extent::Bounded(4));
        assert!(Extent::OpenEnded.fits(u32::MAX));
        assert!(!Extent::Bounded(9).fits(10));
    }

    #[test]
    fn shrink_saturates_and_keeps_open() {
        assert_eq!(Extent::Bounded(5).shrink(7), Extent::Bounded(0));
        assert_eq!(Extent::Bounded(5).shrink(2), Extent::Bounded(3));
        assert_eq!(Extent::OpenEnded.shrink(100), Extent::OpenEnded);
    }

    #[test]
    fn area_treats_zero_side_as_empty() {
        assert!(Area::of(Extent::Bounded(0), Extent::OpenEnded).is_empty());
        assert_eq!(Area::of(Extent::OpenEnded, Extent::Bounded(2)), Area::Unbounded);
        assert_eq!(Area::of(Extent::Bounded(3), Extent::Bounded(4)), Area::Finite(12));
        assert!(Area::Finite(u64::MAX) < Area::Unbounded);
    }

    #[test]
    fn partition_axis_follows_larger_extent() {
        assert_eq!(PartitionAxis::for_extent(Extent::Bounded(12), Extent::OpenEnded), PartitionAxis::Y);
        assert_eq!(PartitionAxis::for_extent(Extent::OpenEnded, Extent::Bounded(12)), PartitionAxis::X);
        assert_eq!(PartitionAxis::for_extent(Extent::Bounded(10), Extent::Bounded(10)), PartitionAxis::Y);
        assert_eq!(PartitionAxis::for_extent(Extent::Bounded(11), Extent::Bounded(10)), PartitionAxis::X);
    }
}
