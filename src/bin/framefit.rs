use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use framefit::{
    TemplateConfig, ViewParams,
    assets::{decode, fetch},
    model::{UI_ZOOM_MAX, UI_ZOOM_MIN},
    naming,
};

#[derive(Parser, Debug)]
#[command(name = "framefit", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite a photo into the frame template and write a PNG.
    Compose(ComposeArgs),
    /// Download the remote frame asset to a local file.
    FetchFrame(FetchFrameArgs),
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Photo to place inside the frame.
    #[arg(long)]
    photo: PathBuf,

    /// Local frame file (SVG or raster). Skips the remote fetch.
    #[arg(long)]
    frame: Option<PathBuf>,

    /// Remote frame URL, used when no local frame is given.
    #[arg(long)]
    frame_url: Option<String>,

    /// Template configuration JSON (hole geometry, frame URL, output prefix).
    #[arg(long)]
    template: Option<PathBuf>,

    /// Photo scale inside the hole (1.0 = exact cover fit).
    #[arg(long, default_value_t = 1.0)]
    zoom: f64,

    /// Horizontal pan in output pixels.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    offset_x: f64,

    /// Vertical pan in output pixels.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    offset_y: f64,

    /// Output PNG path. Defaults to "<prefix>-<photo stem>.png".
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FetchFrameArgs {
    /// Remote frame URL. Defaults to the template's URL.
    #[arg(long)]
    url: Option<String>,

    /// Template configuration JSON.
    #[arg(long)]
    template: Option<PathBuf>,

    /// Destination file.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::FetchFrame(args) => cmd_fetch_frame(args),
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_template(path: Option<&Path>) -> anyhow::Result<TemplateConfig> {
    match path {
        Some(p) => Ok(TemplateConfig::from_path(p)?),
        None => Ok(TemplateConfig::default()),
    }
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let template = load_template(args.template.as_deref())?;

    if !(UI_ZOOM_MIN..=UI_ZOOM_MAX).contains(&args.zoom) {
        anyhow::bail!("zoom must be within {UI_ZOOM_MIN}..={UI_ZOOM_MAX}");
    }
    let view = ViewParams {
        zoom: args.zoom,
        offset_x: args.offset_x,
        offset_y: args.offset_y,
    };
    view.validate()?;

    let photo_bytes = fetch::load_local(&args.photo)?;
    let photo = decode::decode_image(&photo_bytes)?;

    let url = args
        .frame_url
        .clone()
        .unwrap_or_else(|| template.frame_url.clone());
    let frame_bytes = match &args.frame {
        Some(path) => fetch::load_local(path)?,
        None => match fetch::fetch_remote(&url) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(%err, url, "remote frame fetch failed");
                anyhow::bail!(
                    "could not fetch the frame from '{url}'; \
                     download it manually or pass --frame <file> ({err})"
                );
            }
        },
    };
    let frame = decode::decode_frame(&frame_bytes)?;

    let surface = framefit::compose(&photo, &frame, view, &template.hole)?;

    let out = args.out.unwrap_or_else(|| {
        PathBuf::from(naming::output_file_name(&template.file_prefix, &args.photo))
    });
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &out,
        &surface.data,
        surface.width,
        surface.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", out.display()))?;

    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_fetch_frame(args: FetchFrameArgs) -> anyhow::Result<()> {
    let template = load_template(args.template.as_deref())?;
    let url = args.url.unwrap_or_else(|| template.frame_url.clone());

    let bytes = fetch::fetch_remote(&url)?;
    // make sure we saved something the compose path can actually use
    decode::decode_frame(&bytes)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &bytes)
        .with_context(|| format!("write frame '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
