use crate::compositing::blit_rgba;
use crate::config::{Orientation, SheetConfig, SortOrder};
use crate::error::{Result, SpritifyError};
use crate::extent::{Extent, PartitionAxis};
use crate::layout::Layout;
use crate::model::{Meta, Sheet, Sprite};
use image::{DynamicImage, ImageReader, RgbaImage};
use std::path::Path;
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// In-memory image to pack (key + decoded image).
pub struct InputImage {
    pub key: String,
    pub image: DynamicImage,
}

impl InputImage {
    /// Decodes the file at `path`, detecting the format from its content.
    pub fn open(path: impl AsRef<Path>, key: impl Into<String>) -> Result<Self> {
        let image = ImageReader::open(path.as_ref())?
            .with_guessed_format()?
            .decode()?;
        Ok(Self {
            key: key.into(),
            image,
        })
    }
}

/// Packed sheet metadata and its composed RGBA image.
pub struct SpriteOutput {
    pub sheet: Sheet,
    pub rgba: RgbaImage,
}

struct Entry {
    key: String,
    w: u32,
    h: u32,
    source: usize,
}

/// Initial bin for a set of `(width, height)` sizes: one side is locked, the other open-ended.
pub fn virtual_sheet_size(sizes: &[(u32, u32)], cfg: &SheetConfig) -> (Extent, Extent) {
    let max_w = sizes.iter().map(|s| s.0).max().unwrap_or(0);
    let max_h = sizes.iter().map(|s| s.1).max().unwrap_or(0);
    let grow = match cfg.orientation {
        Orientation::Auto if max_w < max_h => PartitionAxis::X,
        Orientation::Auto => PartitionAxis::Y,
        Orientation::Vertical => PartitionAxis::Y,
        Orientation::Horizontal => PartitionAxis::X,
    };
    match grow {
        PartitionAxis::Y => (
            Extent::Bounded(cfg.locked_extent.unwrap_or(max_w)),
            Extent::OpenEnded,
        ),
        PartitionAxis::X => (
            Extent::OpenEnded,
            Extent::Bounded(cfg.locked_extent.unwrap_or(max_h)),
        ),
    }
}

/// Packs `(key, width, height)` triples and returns sheet geometry only.
pub fn pack_layout<K: Into<String>>(items: Vec<(K, u32, u32)>, cfg: SheetConfig) -> Result<Sheet> {
    let entries = items
        .into_iter()
        .enumerate()
        .map(|(source, (key, w, h))| Entry {
            key: key.into(),
            w,
            h,
            source,
        })
        .collect();
    let (sheet, _) = pack_entries(entries, &cfg)?;
    Ok(sheet)
}

#[instrument(skip_all, fields(count = inputs.len()))]
/// Packs `inputs` into one sheet and composes the sheet image.
pub fn pack_sprites(inputs: Vec<InputImage>, cfg: SheetConfig) -> Result<SpriteOutput> {
    let images: Vec<RgbaImage> = inputs.iter().map(|inp| inp.image.to_rgba8()).collect();
    let entries = inputs
        .into_iter()
        .zip(&images)
        .enumerate()
        .map(|(source, (inp, rgba))| Entry {
            key: inp.key,
            w: rgba.width(),
            h: rgba.height(),
            source,
        })
        .collect();
    let (sheet, sources) = pack_entries(entries, &cfg)?;

    let mut canvas = RgbaImage::new(sheet.width, sheet.height);
    for (sprite, &source) in sheet.sprites.iter().zip(&sources) {
        blit_rgba(&images[source], &mut canvas, sprite.frame.x, sprite.frame.y);
    }
    Ok(SpriteOutput {
        sheet,
        rgba: canvas,
    })
}

/// Packs independent sheets. Layouts share no state, so with the `parallel` feature
/// each group runs on the rayon pool.
pub fn pack_many(groups: Vec<Vec<InputImage>>, cfg: &SheetConfig) -> Result<Vec<SpriteOutput>> {
    #[cfg(feature = "parallel")]
    {
        groups
            .into_par_iter()
            .map(|g| pack_sprites(g, cfg.clone()))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        groups
            .into_iter()
            .map(|g| pack_sprites(g, cfg.clone()))
            .collect()
    }
}

/// Returns the sheet plus, per sprite, the `source` index of the entry it came from.
fn pack_entries(mut entries: Vec<Entry>, cfg: &SheetConfig) -> Result<(Sheet, Vec<usize>)> {
    cfg.validate()?;
    if entries.is_empty() {
        return Err(SpritifyError::Empty);
    }
    if let Some(e) = entries.iter().find(|e| e.w == 0 || e.h == 0) {
        return Err(SpritifyError::InvalidInput(format!(
            "{} has zero size ({}x{})",
            e.key, e.w, e.h
        )));
    }

    let sizes: Vec<(u32, u32)> = entries.iter().map(|e| (e.w, e.h)).collect();
    let (width, height) = virtual_sheet_size(&sizes, cfg);
    debug!(%width, %height, "virtual sheet size");

    let mut layout = Layout::try_new(width, height)?.with_spacing(cfg.spacing);
    sort_entries(&mut entries, cfg.sort_order, layout.axis());
    for (idx, e) in entries.iter().enumerate() {
        layout.insert(e.w, e.h, idx)?;
    }
    layout.prune();

    let (Extent::Bounded(sheet_w), Extent::Bounded(sheet_h)) = layout.bounding() else {
        return Err(SpritifyError::InvalidInput(
            "sheet still open-ended after packing".into(),
        ));
    };

    let mut sprites = Vec::with_capacity(layout.len());
    let mut sources = Vec::with_capacity(layout.len());
    for placed in layout.nodes() {
        let e = &entries[*placed.item];
        sprites.push(Sprite {
            key: e.key.clone(),
            frame: placed.rect(),
        });
        sources.push(e.source);
    }
    debug!(width = sheet_w, height = sheet_h, sprites = sprites.len(), "packed sheet");

    let sheet = Sheet {
        width: sheet_w,
        height: sheet_h,
        sprites,
        meta: Meta::new(layout.axis(), cfg.spacing),
    };
    Ok((sheet, sources))
}

fn sort_entries(entries: &mut [Entry], order: SortOrder, grow: PartitionAxis) {
    match order {
        SortOrder::None => {}
        SortOrder::NameAsc => {
            entries.sort_by(|a, b| a.key.cmp(&b.key));
        }
        SortOrder::LockedSideDesc => {
            let locked = |e: &Entry| match grow {
                PartitionAxis::Y => e.w,
                PartitionAxis::X => e.h,
            };
            entries.sort_by(|a, b| locked(b).cmp(&locked(a)).then_with(|| a.key.cmp(&b.key)));
        }
        SortOrder::AreaDesc => {
            entries.sort_by(|a, b| {
                (b.w as u64 * b.h as u64)
                    .cmp(&(a.w as u64 * a.h as u64))
                    .then_with(|| a.key.cmp(&b.key))
            });
        }
        SortOrder::MaxSideDesc => {
            entries.sort_by(|a, b| {
                b.w.max(b.h)
                    .cmp(&a.w.max(a.h))
                    .then_with(|| a.key.cmp(&b.key))
            });
        }
    }
}
