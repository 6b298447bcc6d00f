use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "photobook", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the built-in layout templates.
    Layouts,
    /// Export a saved layout at full resolution.
    Export(ExportArgs),
    /// Fill a layout from a folder of images and save it.
    Import(ImportArgs),
    /// Render the edit-mode preview of a saved layout.
    Preview(PreviewArgs),
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Saved layout JSON.
    #[arg(long)]
    layout: PathBuf,

    /// Output image (.png, .jpg or .jpeg).
    #[arg(long)]
    out: PathBuf,

    /// Override the density stored in the layout.
    #[arg(long)]
    dpi: Option<u32>,
}

#[derive(Parser, Debug)]
struct ImportArgs {
    /// Folder to import from.
    #[arg(long)]
    dir: PathBuf,

    /// Layout template to fill.
    #[arg(long, default_value = photobook::DEFAULT_LAYOUT)]
    layout_name: String,

    /// Output layout JSON.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Saved layout JSON.
    #[arg(long)]
    layout: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Layouts => cmd_layouts(),
        Command::Export(args) => cmd_export(args),
        Command::Import(args) => cmd_import(args),
        Command::Preview(args) => cmd_preview(args),
    }
}

fn cmd_layouts() -> anyhow::Result<()> {
    for t in photobook::LayoutRegistry::all() {
        let orientation = if t.prefers_portrait { "portrait" } else { "landscape" };
        println!("{:<14} {:>2} blocks  {orientation}", t.name, t.block_count());
    }
    Ok(())
}

fn open_layout(path: &Path) -> anyhow::Result<photobook::CollageEngine> {
    let mut engine = photobook::CollageEngine::with_loader(
        photobook::DEFAULT_LAYOUT,
        std::sync::Arc::new(photobook::CachedLoader::new()),
    )?;
    engine
        .load_layout(path)
        .with_context(|| format!("load layout '{}'", path.display()))?;
    Ok(engine)
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let mut engine = open_layout(&args.layout)?;
    if let Some(dpi) = args.dpi {
        engine.set_dpi(dpi)?;
    }
    ensure_parent(&args.out)?;
    engine.export_image(&args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_import(args: ImportArgs) -> anyhow::Result<()> {
    let mut engine = photobook::CollageEngine::new(&args.layout_name)?;
    let count = engine.import_folder(&args.dir)?;
    ensure_parent(&args.out)?;
    engine.save_layout(&args.out, None)?;
    eprintln!("imported {count} images");
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let engine = open_layout(&args.layout)?;
    let page = engine.render_preview();
    ensure_parent(&args.out)?;
    page.save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
