use crate::extent::PartitionAxis;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge (`x + w`).
    pub fn right(&self) -> u32 {
        self.x + self.w
    }
    /// Exclusive bottom edge (`y + h`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }
    /// Returns true if `r` is fully inside `self`.
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }
    /// Returns true if the two rectangles share a region of non-zero area.
    pub fn intersects(&self, r: &Rect) -> bool {
        self.x < r.right() && r.x < self.right() && self.y < r.bottom() && r.y < self.bottom()
    }
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
}

/// A sprite placed on the sheet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sprite<K = String> {
    /// User-specified key (e.g., file path).
    pub key: K,
    pub frame: Rect,
}

/// Sheet-level metadata written by the exporters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Meta {
    /// Schema version of the JSON metadata; current: "1".
    pub schema_version: String,
    pub app: String,
    pub version: String,
    pub format: String,
    /// Axis that was left open while packing.
    pub grow: PartitionAxis,
    pub spacing: u32,
}

impl Meta {
    pub(crate) fn new(grow: PartitionAxis, spacing: u32) -> Self {
        Self {
            schema_version: "1".into(),
            app: "spritify".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            format: "RGBA8888".into(),
            grow,
            spacing,
        }
    }
}

/// A packed sprite sheet: final size plus sprites in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sheet<K = String> {
    pub width: u32,
    pub height: u32,
    pub sprites: Vec<Sprite<K>>,
    pub meta: Meta,
}

/// Statistics about sheet packing efficiency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SheetStats {
    pub num_sprites: usize,
    /// `width * height` of the sheet.
    pub sheet_area: u64,
    /// Sum of sprite areas.
    pub used_area: u64,
    /// used_area / sheet_area (0.0 to 1.0).
    pub occupancy: f64,
}

impl<K> Sheet<K> {
    pub fn stats(&self) -> SheetStats {
        let sheet_area = self.width as u64 * self.height as u64;
        let used_area: u64 = self.sprites.iter().map(|s| s.frame.area()).sum();
        let occupancy = if sheet_area > 0 {
            used_area as f64 / sheet_area as f64
        } else {
            0.0
        };
        SheetStats {
            num_sprites: self.sprites.len(),
            sheet_area,
            used_area,
            occupancy,
        }
    }

    /// Rectangle covering the whole sheet.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }
}

impl SheetStats {
    pub fn summary(&self) -> String {
        format!(
            "Sprites: {}, Occupancy: {:.2}%, Sheet Area: {} px², Used Area: {} px²",
            self.num_sprites,
            self.occupancy * 100.0,
            self.sheet_area,
            self.used_area,
        )
    }

    pub fn wasted_area(&self) -> u64 {
        self.sheet_area.saturating_sub(self.used_area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_rects_do_not_intersect() {
        let a = Rect::new(0, 0, 4, 4);
        assert!(!a.intersects(&Rect::new(4, 0, 2, 2)));
        assert!(!a.intersects(&Rect::new(0, 4, 2, 2)));
        assert!(a.intersects(&Rect::new(3, 3, 2, 2)));
        assert!(a.contains(&Rect::new(1, 1, 3, 3)));
        assert!(!a.contains(&Rect::new(1, 1, 4, 3)));
    }

    #[test]
    fn stats_summarise_occupancy() {
        let sheet: Sheet = Sheet {
            width: 4,
            height: 4,
            sprites: vec![Sprite {
                key: "a".into(),
                frame: Rect::new(0, 0, 2, 4),
            }],
            meta: Meta::new(PartitionAxis::Y, 0),
        };
        let stats = sheet.stats();
        assert_eq!(stats.used_area, 8);
        assert_eq!(stats.wasted_area(), 8);
        assert!((stats.occupancy - 0.5).abs() < f64::EPSILON);
        assert!(stats.summary().contains("50.00%"));
    }
}
