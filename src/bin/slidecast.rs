use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use slidecast::{
    AssemblyConfig, FontSpec, IndexedAssetLayout, Outline, Pipeline, RunState, resolve_plan,
};

#[derive(Parser, Debug)]
#[command(name = "slidecast", version, about = "Assemble narrated slide videos")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every slide, encode one clip per slide and join them into one MP4.
    Assemble(AssembleArgs),
    /// Render a single slide image as PNG.
    Slide(SlideArgs),
    /// Print the resolved slide plan as JSON.
    Plan(PlanArgs),
}

#[derive(Args, Debug)]
struct AssetArgs {
    /// Outline or assembly JSON.
    #[arg(long)]
    plan: PathBuf,

    /// Directory holding `image_<index>.<ext>` files [default: <plan dir>/images].
    #[arg(long)]
    images: Option<PathBuf>,

    /// Directory holding `voiceover_<index>.<ext>` files [default: <plan dir>/voiceovers].
    #[arg(long)]
    voiceovers: Option<PathBuf>,

    /// Background image extension.
    #[arg(long, default_value = "png")]
    image_ext: String,

    /// Narration extension.
    #[arg(long, default_value = "mp3")]
    voiceover_ext: String,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// JSON config file; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Heading font file (TTF/OTF).
    #[arg(long)]
    heading_font: Option<PathBuf>,

    /// Bullet font file (TTF/OTF).
    #[arg(long)]
    body_font: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct AssembleArgs {
    #[command(flatten)]
    assets: AssetArgs,

    #[command(flatten)]
    render: RenderArgs,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Directory for intermediate slide images and clips.
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Keep intermediate slide images and clips.
    #[arg(long)]
    keep_intermediates: bool,
}

#[derive(Parser, Debug)]
struct SlideArgs {
    #[command(flatten)]
    assets: AssetArgs,

    #[command(flatten)]
    render: RenderArgs,

    /// 1-based slide index.
    #[arg(long)]
    index: u32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    #[command(flatten)]
    assets: AssetArgs,

    /// JSON config file (for the conclusion heading).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.cmd {
        Command::Assemble(args) => cmd_assemble(args),
        Command::Slide(args) => cmd_slide(args),
        Command::Plan(args) => cmd_plan(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AssemblyConfig> {
    match path {
        Some(p) => Ok(AssemblyConfig::from_json_file(p)?),
        None => Ok(AssemblyConfig::default()),
    }
}

fn apply_render_args(cfg: &mut AssemblyConfig, args: &RenderArgs) {
    if let Some(p) = &args.heading_font {
        cfg.fonts.heading = FontSpec {
            path: Some(p.clone()),
            bold: cfg.fonts.heading.bold,
        };
    }
    if let Some(p) = &args.body_font {
        cfg.fonts.body = FontSpec {
            path: Some(p.clone()),
            bold: cfg.fonts.body.bold,
        };
    }
}

fn asset_layout(args: &AssetArgs) -> IndexedAssetLayout {
    let root = args
        .plan
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let defaults = IndexedAssetLayout::under(root);
    IndexedAssetLayout::new(
        args.images.clone().unwrap_or(defaults.image_dir),
        args.voiceovers.clone().unwrap_or(defaults.narration_dir),
    )
    .with_image_ext(args.image_ext.clone())
    .with_narration_ext(args.voiceover_ext.clone())
}

fn cmd_assemble(args: AssembleArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.render.config.as_deref())?;
    apply_render_args(&mut cfg, &args.render);
    if let Some(dir) = &args.work_dir {
        cfg.work_dir = dir.clone();
    }
    if args.keep_intermediates {
        cfg.keep_intermediates = true;
    }

    let outline = Outline::from_json_file(&args.assets.plan)?;
    let layout = asset_layout(&args.assets);
    let mut pipeline = Pipeline::new(cfg)?;

    match pipeline.assemble(&outline, &layout, &args.out) {
        Ok(report) => {
            for s in report.degraded() {
                eprintln!(
                    "slide {}: background {:?}, narration {}",
                    s.index,
                    s.background,
                    if s.narration_degraded {
                        "fallback"
                    } else {
                        "ok"
                    }
                );
            }
            eprintln!(
                "wrote {} ({} slides, {:.1}s)",
                report.output.display(),
                report.slides.len(),
                report.total_duration_sec()
            );
            Ok(())
        }
        Err(e) => {
            if let RunState::Aborted { stage, index, .. } = pipeline.state() {
                match index {
                    Some(i) => eprintln!("aborted while {stage} slide {i}"),
                    None => eprintln!("aborted while {stage}"),
                }
            }
            Err(e.into())
        }
    }
}

fn cmd_slide(args: SlideArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.render.config.as_deref())?;
    apply_render_args(&mut cfg, &args.render);

    let outline = Outline::from_json_file(&args.assets.plan)?;
    let plan = resolve_plan(&outline, &asset_layout(&args.assets), &cfg.conclusion_heading)?;
    let unit = plan.unit(args.index).with_context(|| {
        format!(
            "slide index {} out of range (plan has {} slides)",
            args.index,
            plan.slide_count()
        )
    })?;

    let mut pipeline = Pipeline::new(cfg)?;
    let background = pipeline.render_slide(unit, &args.out)?;
    eprintln!(
        "wrote {} (background {:?})",
        args.out.display(),
        background
    );
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let outline = Outline::from_json_file(&args.assets.plan)?;
    let plan = resolve_plan(&outline, &asset_layout(&args.assets), &cfg.conclusion_heading)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&plan).context("serialize plan")?
    );
    Ok(())
}
