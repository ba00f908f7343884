use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use blocs_atlas_core::config::DEFAULT_ATLAS_SIZE;
use blocs_atlas_core::{
    Atlas, AtlasConfig, LayoutItem, PackOutput, PackStats, PixelImage, pack_images, pack_layout,
    to_json, to_json_hash,
};
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSetBuilder};
use image::ImageReader;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use tracing::{debug, error, info};
use walkdir::WalkDir;

mod demo;

#[derive(Parser, Debug)]
#[command(
    name = "blocs-atlas",
    about = "Pack images into a square texture atlas",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack images into an atlas (PNG + JSON manifest)
    Pack(PackArgs),
    /// Layout-only export (no PNG): read image dimensions and write the manifest
    Layout(PackArgs),
    /// Pack randomly colored boxes
    Demo(DemoArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Input/Output
    /// Input file or directory
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output atlas path; the manifest is written next to it as <stem>.json
    #[arg(short, long, default_value = "atlas.png", help_heading = "Input/Output")]
    output: PathBuf,
    /// YAML config file path (fields override the command line)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Layout
    /// Atlas width and height
    #[arg(short, long, default_value_t = DEFAULT_ATLAS_SIZE, help_heading = "Layout")]
    size: u32,

    // Image Processing
    /// Pixels of edge replication around each texture
    #[arg(short, long, default_value_t = 0, help_heading = "Image Processing")]
    expand: u32,
    /// Empty pixels between textures
    #[arg(short, long, default_value_t = 0, help_heading = "Image Processing")]
    border: u32,
    /// Remove duplicate images (not implemented; only logs a warning)
    #[arg(short, long, default_value_t = false, help_heading = "Image Processing")]
    unique: bool,

    // Export
    /// Metadata format: json | json-hash
    #[arg(long, value_parser = ["json", "json-hash"], default_value = "json", help_heading = "Export")]
    metadata: String,
    /// Write packing stats as JSON to this path
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the resolved configuration and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Format for --print-config: json | yaml
    #[arg(long, value_parser = ["json", "yaml"], default_value = "json", help_heading = "Export")]
    print_config_format: String,
    /// Pack but do not write any file
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct DemoArgs {
    /// Output atlas path
    #[arg(short, long, default_value = "demo.png")]
    output: PathBuf,
    /// Atlas width and height
    #[arg(short, long, default_value_t = 960)]
    size: u32,
    /// Pixels of edge replication around each box
    #[arg(short, long, default_value_t = 0)]
    expand: u32,
    /// Empty pixels between boxes
    #[arg(short, long, default_value_t = 0)]
    border: u32,
    /// Seed for a reproducible box set
    #[arg(long)]
    seed: Option<u64>,
    /// Metadata format: json | json-hash
    #[arg(long, value_parser = ["json", "json-hash"], default_value = "json")]
    metadata: String,
    /// Pack but do not write any file
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args, cli.progress && !cli.quiet),
        Commands::Layout(args) => run_layout(args),
        Commands::Demo(args) => run_demo(args),
    }
}

fn run_pack(cli: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let cfg = resolve_config(cli)?;
    if cli.print_config {
        return print_config(&cfg, &cli.print_config_format);
    }
    let started = Instant::now();

    let stage = Instant::now();
    let paths = gather_paths(&cli.input, &cli.include, &cli.exclude)?;
    debug!(count = paths.len(), elapsed = %fmt_dur(stage.elapsed()), "found graphics");

    let stage = Instant::now();
    let inputs = load_images_with_progress(&paths, show_progress)?;
    if inputs.is_empty() {
        anyhow::bail!("no images found in {}", cli.input.display());
    }
    info!(count = inputs.len(), elapsed = %fmt_dur(stage.elapsed()), "loaded input images");

    let out = pack_images(&inputs, &cfg)?;
    drop(inputs);
    let stats = out.stats();
    write_atlas(
        out,
        &OutputPaths::from_output(&cli.output),
        &cli.metadata,
        cli.dry_run,
    )?;
    if let Some(stats_path) = cli.export_stats.as_ref().filter(|_| !cli.dry_run) {
        write_stats(&stats, stats_path)?;
    }
    info!(elapsed = %fmt_dur(started.elapsed()), "done");
    Ok(())
}

fn run_layout(cli: &PackArgs) -> anyhow::Result<()> {
    let cfg = resolve_config(cli)?;
    if cli.print_config {
        return print_config(&cfg, &cli.print_config_format);
    }
    let started = Instant::now();
    let paths = gather_paths(&cli.input, &cli.include, &cli.exclude)?;

    let mut items: Vec<LayoutItem> = Vec::with_capacity(paths.len());
    for p in &paths {
        match image::image_dimensions(p) {
            Ok((w, h)) => items.push(LayoutItem {
                key: image_key(p),
                w,
                h,
            }),
            Err(e) => error!(?p, error = %e, "skip image"),
        }
    }
    if items.is_empty() {
        anyhow::bail!("no images found in {}", cli.input.display());
    }
    info!(count = items.len(), "read image dimensions");

    let atlas = pack_layout(&items, &cfg)?;
    log_stats(&atlas);
    let targets = OutputPaths::from_output(&cli.output);
    if !cli.dry_run {
        targets.ensure_dir()?;
        write_manifest(&atlas, &targets.json, &cli.metadata)?;
        if let Some(stats_path) = &cli.export_stats {
            write_stats(&atlas.stats(), stats_path)?;
        }
    }
    info!(elapsed = %fmt_dur(started.elapsed()), "layout done");
    Ok(())
}

fn run_demo(args: &DemoArgs) -> anyhow::Result<()> {
    let cfg = AtlasConfig::builder()
        .size(args.size)
        .expand(args.expand)
        .border(args.border)
        .build();
    cfg.validate()?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let inputs = demo::random_boxes(&mut rng)?;
    info!(count = inputs.len(), seed = ?args.seed, "generated demo boxes");

    let started = Instant::now();
    let out = pack_images(&inputs, &cfg)?;
    write_atlas(
        out,
        &OutputPaths::from_output(&args.output),
        &args.metadata,
        args.dry_run,
    )?;
    info!(elapsed = %fmt_dur(started.elapsed()), "done");
    Ok(())
}

fn resolve_config(cli: &PackArgs) -> anyhow::Result<AtlasConfig> {
    let base = AtlasConfig {
        size: cli.size,
        expand: cli.expand,
        border: cli.border,
        unique: cli.unique,
    };
    let cfg = if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        y.into_atlas_config(base)
    } else {
        base
    };
    cfg.validate()?;
    Ok(cfg)
}

fn print_config(cfg: &AtlasConfig, format: &str) -> anyhow::Result<()> {
    match format {
        "yaml" => println!("{}", serde_yaml::to_string(cfg)?),
        _ => println!("{}", serde_json::to_string_pretty(cfg)?),
    }
    Ok(())
}

/// Atlas image and manifest locations derived from `-o`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct OutputPaths {
    dir: PathBuf,
    png: PathBuf,
    json: PathBuf,
}

impl OutputPaths {
    fn from_output(output: &Path) -> Self {
        let dir = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let stem = output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("atlas");
        Self {
            png: dir.join(format!("{stem}.png")),
            json: dir.join(format!("{stem}.json")),
            dir,
        }
    }

    fn ensure_dir(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output dir {}", self.dir.display()))
    }
}

fn write_atlas(
    out: PackOutput,
    targets: &OutputPaths,
    metadata: &str,
    dry_run: bool,
) -> anyhow::Result<()> {
    log_stats(&out.atlas);
    if dry_run {
        info!("dry run, nothing written");
        return Ok(());
    }
    targets.ensure_dir()?;
    write_manifest(&out.atlas, &targets.json, metadata)?;

    let stage = Instant::now();
    let png = out.into_rgba_image()?;
    png.save(&targets.png)
        .with_context(|| format!("write {}", targets.png.display()))?;
    debug!(path = ?targets.png, elapsed = %fmt_dur(stage.elapsed()), "saved atlas image");
    info!(dir = %targets.dir.display(), "saved");
    Ok(())
}

fn write_manifest(atlas: &Atlas, path: &Path, metadata: &str) -> anyhow::Result<()> {
    let manifest = atlas.manifest();
    let value = match metadata {
        "json-hash" => to_json_hash(&manifest),
        _ => to_json(&manifest),
    };
    fs::write(path, serde_json::to_vec_pretty(&value)?)
        .with_context(|| format!("write {}", path.display()))?;
    info!(?path, textures = manifest.n, "manifest written");
    Ok(())
}

fn write_stats(stats: &PackStats, path: &Path) -> anyhow::Result<()> {
    fs::write(path, serde_json::to_vec_pretty(stats)?)
        .with_context(|| format!("write {}", path.display()))?;
    info!(?path, "stats exported");
    Ok(())
}

fn log_stats(atlas: &Atlas) {
    let stats = atlas.stats();
    info!(
        textures = stats.num_textures,
        used_area = stats.used_area,
        atlas_area = stats.atlas_area,
        occupancy = format!("{:.2}%", stats.occupancy * 100.0),
        "atlas stats"
    );
}

fn fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}us", d.as_micros())
    }
}

fn gather_paths(
    path: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    let inc_set = build_glob_set(include)?;
    let exc_set = build_glob_set(exclude)?;
    let mut list: Vec<PathBuf> = Vec::new();
    if path.is_file() {
        if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) && is_image(path) {
            list.push(path.to_path_buf());
        }
    } else {
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let p = entry.path();
            if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_image(p) {
                list.push(p.to_path_buf());
            }
        }
    }
    Ok(list)
}

fn build_glob_set(patterns: &[String]) -> anyhow::Result<Option<globset::GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat).with_context(|| format!("invalid glob {pat}"))?);
    }
    Ok(Some(b.build()?))
}

fn should_skip(
    p: &Path,
    include: Option<&globset::GlobSet>,
    exclude: Option<&globset::GlobSet>,
) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg")
    )
}

/// Manifest name for an input file: its stem.
fn image_key(p: &Path) -> String {
    p.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| p.to_string_lossy().into_owned())
}

fn load_images_with_progress(
    paths: &[PathBuf],
    progress: bool,
) -> anyhow::Result<Vec<PixelImage>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if let Some(b) = &bar {
            b.set_message(msg.to_string());
        }
        match load_image(p) {
            Ok(img) => {
                debug!(?p, w = img.width, h = img.height, "loaded");
                list.push(img);
            }
            Err(e) => {
                error!(?p, error = %e, "skip image");
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(list)
}

fn load_image(p: &Path) -> anyhow::Result<PixelImage> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    Ok(PixelImage::from_rgba_image(image_key(p), img.to_rgba8())?)
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

#[derive(Debug, Default, Deserialize)]
struct YamlConfig {
    size: Option<u32>,
    expand: Option<u32>,
    border: Option<u32>,
    unique: Option<bool>,
}

impl YamlConfig {
    fn into_atlas_config(self, mut cfg: AtlasConfig) -> AtlasConfig {
        if let Some(v) = self.size {
            cfg.size = v;
        }
        if let Some(v) = self.expand {
            cfg.expand = v;
        }
        if let Some(v) = self.border {
            cfg.border = v;
        }
        if let Some(v) = self.unique {
            cfg.unique = v;
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_paths_share_the_stem() {
        let t = OutputPaths::from_output(Path::new("out/sheet.png"));
        assert_eq!(t.dir, PathBuf::from("out"));
        assert_eq!(t.png, PathBuf::from("out/sheet.png"));
        assert_eq!(t.json, PathBuf::from("out/sheet.json"));
    }

    #[test]
    fn bare_file_name_writes_to_cwd() {
        let t = OutputPaths::from_output(Path::new("atlas.png"));
        assert_eq!(t.dir, PathBuf::from("."));
        assert_eq!(t.json, PathBuf::from("./atlas.json"));
    }

    #[test]
    fn yaml_overrides_only_the_fields_it_sets() {
        let y: YamlConfig = serde_yaml::from_str("size: 512\nborder: 3\n").expect("yaml");
        let base = AtlasConfig::builder().size(4096).expand(2).build();
        let cfg = y.into_atlas_config(base);
        assert_eq!(cfg.size, 512);
        assert_eq!(cfg.expand, 2);
        assert_eq!(cfg.border, 3);
        assert!(!cfg.unique);
    }

    #[test]
    fn only_png_and_jpeg_are_images() {
        assert!(is_image(Path::new("a/b.PNG")));
        assert!(is_image(Path::new("c.jpeg")));
        assert!(is_image(Path::new("c.jpg")));
        assert!(!is_image(Path::new("c.gif")));
        assert!(!is_image(Path::new("noext")));
    }

    #[test]
    fn image_key_is_the_file_stem() {
        assert_eq!(image_key(Path::new("sprites/hero_idle.png")), "hero_idle");
    }

    #[test]
    fn exclude_wins_over_include() {
        let inc = build_glob_set(&["**/*.png".into()]).expect("inc");
        let exc = build_glob_set(&["**/skip/**".into()]).expect("exc");
        assert!(!should_skip(Path::new("a/keep/x.png"), inc.as_ref(), exc.as_ref()));
        assert!(should_skip(Path::new("a/skip/x.png"), inc.as_ref(), exc.as_ref()));
        assert!(should_skip(Path::new("a/keep/x.jpg"), inc.as_ref(), exc.as_ref()));
    }
}
