use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which side of the sheet is left open while packing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Compare the widest and the tallest input: if the widest image is narrower than the
    /// tallest is tall the sheet grows horizontally, otherwise vertically.
    Auto,
    /// Fixed width, height grows.
    Vertical,
    /// Fixed height, width grows.
    Horizontal,
}

impl FromStr for Orientation {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "vertical" | "v" => Ok(Self::Vertical),
            "horizontal" | "h" => Ok(Self::Horizontal),
            _ => Err(()),
        }
    }
}

/// Insertion order of sprites. All orders are stable with the key as tie-break.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Descending by the sheet's locked dimension (width for vertical sheets).
    LockedSideDesc,
    AreaDesc,
    MaxSideDesc,
    NameAsc,
    None,
}

impl FromStr for SortOrder {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "locked_side_desc" => Ok(Self::LockedSideDesc),
            "area_desc" => Ok(Self::AreaDesc),
            "max_side_desc" => Ok(Self::MaxSideDesc),
            "name_asc" => Ok(Self::NameAsc),
            "none" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SheetConfig {
    #[serde(default = "default_orientation")]
    pub orientation: Orientation,
    /// Size of the locked side. `None` uses the largest input along that side.
    #[serde(default)]
    pub locked_extent: Option<u32>,
    /// Pixels between sprites.
    #[serde(default)]
    pub spacing: u32,
    #[serde(default = "default_sort_order")]
    pub sort_order: SortOrder,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            orientation: default_orientation(),
            locked_extent: None,
            spacing: 0,
            sort_order: default_sort_order(),
        }
    }
}

impl SheetConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::SpritifyError;

        if self.locked_extent == Some(0) {
            return Err(SpritifyError::InvalidConfig(
                "locked_extent must be at least 1 pixel".into(),
            ));
        }
        Ok(())
    }

    /// Create a fluent builder for `SheetConfig`.
    pub fn builder() -> SheetConfigBuilder {
        SheetConfigBuilder::new()
    }
}

fn default_orientation() -> Orientation {
    Orientation::Auto
}
fn default_sort_order() -> SortOrder {
    SortOrder::LockedSideDesc
}

/// Builder for `SheetConfig`.
#[derive(Debug, Default, Clone)]
pub struct SheetConfigBuilder {
    cfg: SheetConfig,
}

impl SheetConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: SheetConfig::default(),
        }
    }
    pub fn orientation(mut self, v: Orientation) -> Self {
        self.cfg.orientation = v;
        self
    }
    pub fn locked_extent(mut self, v: Option<u32>) -> Self {
        self.cfg.locked_extent = v;
        self
    }
    pub fn spacing(mut self, v: u32) -> Self {
        self.cfg.spacing = v;
        self
    }
    pub fn sort_order(mut self, v: SortOrder) -> Self {
        self.cfg.sort_order = v;
        self
    }
    pub fn build(self) -> SheetConfig {
        self.cfg
    }
}
