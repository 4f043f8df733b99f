//! Core library for packing images into CSS sprite sheets.
//!
//! - Layout: binary space-partition tree with one open-ended axis (`layout::Layout`)
//! - Pipeline: `pack_sprites` takes in-memory images and returns the composed sheet + metadata
//! - Exporters: CSS rules, an HTML preview page and JSON (array/hash) metadata
//!
//! Quick example:
//! ```ignore
//! use spritify_core::{InputImage, SheetConfig, pack_sprites, to_css, CssOptions};
//! # fn main() -> anyhow::Result<()> {
//! let inputs = vec![
//!   InputImage::open("icons/a.png", "icons/a.png")?,
//!   InputImage::open("icons/b.png", "icons/b.png")?,
//! ];
//! let out = pack_sprites(inputs, SheetConfig::default())?;
//! out.rgba.save("sprite.png")?;
//! println!("{}", to_css(&out.sheet, &CssOptions::default()));
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod export_css;
pub mod extent;
pub mod layout;
pub mod model;
pub mod pipeline;

pub use config::*;
pub use error::*;
pub use export::*;
pub use export_css::*;
pub use extent::*;
pub use model::*;
pub use pipeline::*;

/// Convenience prelude for common types and functions.
/// Importing `spritify_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{Orientation, SheetConfig, SheetConfigBuilder, SortOrder};
    pub use crate::export_css::CssOptions;
    pub use crate::extent::{Extent, PartitionAxis};
    pub use crate::layout::{Layout, PlacedRect};
    pub use crate::model::{Meta, Rect, Sheet, SheetStats, Sprite};
    pub use crate::{
        InputImage, LayoutError, SpriteOutput, SpritifyError, pack_layout, pack_many, pack_sprites,
    };
}
