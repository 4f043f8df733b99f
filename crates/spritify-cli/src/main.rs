use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{ArgAction, Parser};
use globset::{Glob, GlobSet, GlobSetBuilder};
use handlebars::Handlebars;
use image::{ImageFormat, ImageReader};
use serde::{Deserialize, Serialize};
use spritify_core::config::{Orientation, SheetConfig, SortOrder};
use spritify_core::{CssOptions, InputImage, Sheet, css_class_name, pack_sprites};
use tracing::{error, info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "spritify",
    about = "Create a sprite and a corresponding CSS file from the images in a directory",
    version,
    author
)]
struct Cli {
    // Input
    /// Directory to scan for images (default: current directory)
    #[arg(help_heading = "Input")]
    directory: Option<PathBuf>,
    /// Stop on the first image that fails to decode (default: skip it)
    #[arg(short = 'f', long, default_value_t = false, help_heading = "Input")]
    stop: bool,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input")]
    exclude: Vec<String>,
    /// YAML config file path (overrides sprite layout options)
    #[arg(long, help_heading = "Input")]
    config: Option<PathBuf>,

    // CSS
    /// Name of the CSS file
    #[arg(short = 'c', long = "css", default_value = "sprite.css", help_heading = "CSS")]
    css: PathBuf,
    /// Selector of the CSS class defining the background url
    #[arg(short = 'n', long = "classname", default_value = ".sprite", help_heading = "CSS")]
    classname: String,
    /// Prefix for the sprite name in the background-image url. Use it when the sprite and
    /// CSS files are not written to the same directory
    #[arg(short = 'p', long = "cssimagepath", default_value = "", help_heading = "CSS")]
    css_image_path: String,

    // Sprite
    /// Name of the sprite file (always written as PNG)
    #[arg(short = 's', long = "sprite", default_value = "sprite.png", help_heading = "Sprite")]
    sprite: PathBuf,
    /// Growth direction: auto | vertical | horizontal
    #[arg(long, default_value = "auto", help_heading = "Sprite")]
    orientation: String,
    /// Fixed size of the locked side (default: largest image along that side)
    #[arg(long, help_heading = "Sprite")]
    locked_extent: Option<u32>,
    /// Pixels between sprites
    #[arg(long, default_value_t = 0, help_heading = "Sprite")]
    spacing: u32,
    /// Sort order: locked_side_desc|area_desc|max_side_desc|name_asc|none
    #[arg(long, default_value = "locked_side_desc", help_heading = "Sprite")]
    sort_order: String,

    // Export
    /// Also write JSON (hash) metadata to this file
    #[arg(long, help_heading = "Export")]
    json: Option<PathBuf>,
    /// Also write an HTML preview page to this file
    #[arg(long, help_heading = "Export")]
    html: Option<PathBuf>,
    /// Built-in stylesheet template: scss | less
    #[arg(long, help_heading = "Export")]
    preset: Option<String>,
    /// External template file (handlebars)
    #[arg(long, help_heading = "Export")]
    template: Option<PathBuf>,
    /// Output path for --template / --preset
    #[arg(long, help_heading = "Export")]
    template_out: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compute layout and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,

    // Logging/UX
    /// Show a progress bar while loading images
    #[arg(long, default_value_t = true, action = ArgAction::Set, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(short, long, default_value_t = false, help_heading = "Logging/UX")]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    run(&cli)
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let dir = match &cli.directory {
        Some(d) => d.clone(),
        None => std::env::current_dir().context("resolve current directory")?,
    };
    if !dir.is_dir() {
        anyhow::bail!("{} is not a directory", dir.display());
    }

    let mut cfg = SheetConfig {
        orientation: parse_orientation(&cli.orientation)?,
        locked_extent: cli.locked_extent,
        spacing: cli.spacing,
        sort_order: parse_sort_order(&cli.sort_order)?,
    };
    if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)?;
        cfg = y.into_sheet_config(cfg)?;
    }

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    info!(directory = %dir.display(), "scanning for images");
    let paths = gather_images(&dir, &cli.include, &cli.exclude)?;
    if paths.is_empty() {
        anyhow::bail!("Directory {} doesn't contain any image files", dir.display());
    }
    let inputs = load_images(&dir, &paths, cli.progress && !cli.quiet, cli.stop)?;
    info!(count = inputs.len(), "loaded input images");

    let t0 = Instant::now();
    let out = pack_sprites(inputs, cfg).context("pack sprites")?;
    let stats = out.sheet.stats();
    info!(
        width = out.sheet.width,
        height = out.sheet.height,
        sprites = stats.num_sprites,
        occupancy = %format!("{:.2}%", stats.occupancy * 100.0),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "packed sprite"
    );
    if cli.dry_run {
        println!("{}", stats.summary());
        return Ok(());
    }

    ensure_parent(&cli.sprite)?;
    out.rgba
        .save_with_format(&cli.sprite, ImageFormat::Png)
        .with_context(|| format!("write {}", cli.sprite.display()))?;
    info!(path = %cli.sprite.display(), "sprite written");

    let image_name = cli
        .sprite
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let css_opts = CssOptions {
        class_name: cli.classname.clone(),
        image_url: format!("{}{}", cli.css_image_path, image_name),
    };
    write_text(&cli.css, &spritify_core::to_css(&out.sheet, &css_opts))?;
    info!(path = %cli.css.display(), "css written");

    if let Some(json_path) = &cli.json {
        let value = spritify_core::to_json_hash(&out.sheet);
        write_text(json_path, &serde_json::to_string_pretty(&value)?)?;
        info!(path = %json_path.display(), "json written");
    }

    if let Some(html_path) = &cli.html {
        let css_href = cli
            .css
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        write_text(
            html_path,
            &spritify_core::to_html_preview(&out.sheet, &css_opts, &css_href),
        )?;
        info!(path = %html_path.display(), "html preview written");
    }

    render_template(cli, &out.sheet, &css_opts)?;
    Ok(())
}

fn render_template(cli: &Cli, sheet: &Sheet, css: &CssOptions) -> anyhow::Result<()> {
    let tpl_owned_from_file: Option<String> = match &cli.template {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("read template {}", path.display()))?,
        ),
        None => None,
    };
    let tpl_ref: &str = if let Some(preset) = &cli.preset {
        match preset.to_ascii_lowercase().as_str() {
            "scss" => include_str!("templates/scss.hbs"),
            "less" => include_str!("templates/less.hbs"),
            other => anyhow::bail!("unknown template preset: {}", other),
        }
    } else if let Some(ref s) = tpl_owned_from_file {
        s.as_str()
    } else {
        return Ok(());
    };
    let Some(out_path) = &cli.template_out else {
        anyhow::bail!("--template-out is required with --template or --preset");
    };

    let ctx = build_template_context(sheet, css);
    let mut reg = Handlebars::new();
    reg.set_strict_mode(true);
    reg.register_escape_fn(handlebars::no_escape);
    reg.register_template_string("tpl", tpl_ref)?;
    let rendered = reg.render("tpl", &ctx)?;
    write_text(out_path, &rendered)?;
    info!(path = %out_path.display(), "template written");
    Ok(())
}

#[derive(Debug, Serialize)]
struct TemplateContext {
    image: String,
    class_name: String,
    width: u32,
    height: u32,
    sprites: Vec<TemplateSprite>,
    meta: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct TemplateSprite {
    name: String,
    css_class: String,
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

fn build_template_context(sheet: &Sheet, css: &CssOptions) -> TemplateContext {
    let sprites = sheet
        .sprites
        .iter()
        .map(|s| TemplateSprite {
            name: s.key.clone(),
            css_class: css_class_name(&s.key),
            x: s.frame.x,
            y: s.frame.y,
            w: s.frame.w,
            h: s.frame.h,
        })
        .collect();
    let meta = serde_json::json!({
        "app": sheet.meta.app,
        "version": sheet.meta.version,
        "format": sheet.meta.format,
        "grow": sheet.meta.grow,
        "spacing": sheet.meta.spacing,
    });
    TemplateContext {
        image: css.image_url.clone(),
        class_name: css.class_name.clone(),
        width: sheet.width,
        height: sheet.height,
        sprites,
        meta,
    }
}

fn build_globset(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat)?);
    }
    Ok(Some(b.build()?))
}

fn gather_images(dir: &Path, include: &[String], exclude: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let inc_set = build_globset(include)?;
    let exc_set = build_globset(exclude)?;
    let mut list: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
        let p = entry.path();
        if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_image(p) {
            list.push(p.to_path_buf());
        }
    }
    Ok(list)
}

fn should_skip(p: &Path, inc: Option<&GlobSet>, exc: Option<&GlobSet>) -> bool {
    if let Some(set) = inc {
        if !set.is_match(p) {
            return true;
        }
    }
    if let Some(set) = exc {
        if set.is_match(p) {
            return true;
        }
    }
    false
}

/// Sniffs the file header; the extension is not trusted.
fn is_image(p: &Path) -> bool {
    ImageReader::open(p)
        .and_then(|r| r.with_guessed_format())
        .map(|r| r.format().is_some())
        .unwrap_or(false)
}

fn load_images(
    root: &Path,
    paths: &[PathBuf],
    progress: bool,
    stop: bool,
) -> anyhow::Result<Vec<InputImage>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
        ) {
            b.set_style(style);
        }
        Some(b)
    } else {
        None
    };
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        if let Some(b) = &bar {
            b.set_message(p.file_name().and_then(|s| s.to_str()).unwrap_or("").to_string());
        }
        let key = p
            .strip_prefix(root)
            .unwrap_or(p)
            .to_string_lossy()
            .replace('\\', "/");
        match InputImage::open(p, key) {
            Ok(img) => list.push(img),
            Err(e) if stop => {
                if let Some(b) = &bar {
                    b.abandon();
                }
                return Err(e).with_context(|| format!("failed to open {}", p.display()));
            }
            Err(e) => {
                error!(path = %p.display(), error = %e, "skip image");
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    if list.is_empty() {
        warn!("no image could be decoded");
    }
    Ok(list)
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
    }
    Ok(())
}

fn write_text(path: &Path, text: &str) -> anyhow::Result<()> {
    ensure_parent(path)?;
    fs::write(path, text).with_context(|| format!("write {}", path.display()))
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    orientation: Option<String>,
    locked_extent: Option<u32>,
    spacing: Option<u32>,
    sort_order: Option<String>,
}

impl YamlConfig {
    fn into_sheet_config(self, mut cfg: SheetConfig) -> anyhow::Result<SheetConfig> {
        if let Some(v) = self.orientation {
            cfg.orientation = parse_orientation(&v)?;
        }
        if let Some(v) = self.locked_extent {
            cfg.locked_extent = Some(v);
        }
        if let Some(v) = self.spacing {
            cfg.spacing = v;
        }
        if let Some(v) = self.sort_order {
            cfg.sort_order = parse_sort_order(&v)?;
        }
        Ok(cfg)
    }
}

fn parse_orientation(s: &str) -> anyhow::Result<Orientation> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown orientation: {}", s))
}

fn parse_sort_order(s: &str) -> anyhow::Result<SortOrder> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown sort order: {}", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use spritify_core::pack_layout;

    #[test]
    fn yaml_overrides_only_given_fields() {
        let y: YamlConfig = serde_yaml::from_str("spacing: 3\norientation: horizontal\n").unwrap();
        let cfg = y.into_sheet_config(SheetConfig::default()).unwrap();
        assert_eq!(cfg.spacing, 3);
        assert_eq!(cfg.orientation, Orientation::Horizontal);
        assert_eq!(cfg.sort_order, SortOrder::LockedSideDesc);
        assert_eq!(cfg.locked_extent, None);
    }

    #[test]
    fn yaml_rejects_unknown_sort_order() {
        let y: YamlConfig = serde_yaml::from_str("sort_order: sideways\n").unwrap();
        assert!(y.into_sheet_config(SheetConfig::default()).is_err());
    }

    #[test]
    fn globs_filter_paths() {
        let inc = build_globset(&["**/*.png".to_string()]).unwrap();
        let exc = build_globset(&["**/skip/**".to_string()]).unwrap();
        assert!(!should_skip(Path::new("a/b.png"), inc.as_ref(), exc.as_ref()));
        assert!(should_skip(Path::new("a/b.gif"), inc.as_ref(), exc.as_ref()));
        assert!(should_skip(Path::new("a/skip/b.png"), inc.as_ref(), exc.as_ref()));
        assert!(!should_skip(Path::new("x.gif"), None, None));
    }

    #[test]
    fn scss_preset_renders_every_sprite() {
        let sheet = pack_layout(vec![("icons/a.png", 4, 2), ("b.png", 2, 2)], SheetConfig::default())
            .unwrap();
        let css = CssOptions {
            class_name: ".sprite".into(),
            image_url: "img/sprite.png?v=1".into(),
        };
        let ctx = build_template_context(&sheet, &css);
        let mut reg = Handlebars::new();
        reg.set_strict_mode(true);
        reg.register_escape_fn(handlebars::no_escape);
        reg.register_template_string("tpl", include_str!("templates/scss.hbs"))
            .unwrap();
        let out = reg.render("tpl", &ctx).unwrap();
        assert!(out.contains("$sprite-image: \"img/sprite.png?v=1\";"));
        assert!(out.contains("\"a\": (0px, 0px, 4px, 2px),"));
        assert!(out.contains("\"b\": (0px, 2px, 2px, 2px),"));
    }
}
