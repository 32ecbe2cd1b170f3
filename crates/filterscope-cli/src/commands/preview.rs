use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Args;
use console::Style;
use filterscope_core::capture::default_opener;
use filterscope_core::config::PreviewConfig;
use filterscope_core::filters::{FilterKind, FilterSpec};
use filterscope_core::pipeline::{run as run_ticks, RunLimits, RunSummary, Scheduler, StatusEvent};
use filterscope_core::source::SourceRequest;
use filterscope_core::viewport::ViewportId;
use tracing::info;

use crate::summary::{print_preview_summary, print_session_report};

#[derive(Args)]
pub struct PreviewArgs {
    /// Image file to preview
    #[arg(long, conflicts_with = "camera", required_unless_present = "camera")]
    pub image: Option<PathBuf>,

    /// Capture device index
    #[arg(long)]
    pub camera: Option<u32>,

    /// Filter: identity, box_blur, gaussian_blur, sharpen, sobel, canny
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Filter parameter as name=value (e.g. "sigma=2.5"); repeatable
    #[arg(short, long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,

    /// Zoom factor for both views (0.1 to 3.0)
    #[arg(long)]
    pub zoom: Option<f32>,

    /// Stop a live preview after this many ticks
    #[arg(long)]
    pub ticks: Option<u64>,

    /// Stop a live preview after this many seconds
    #[arg(long)]
    pub duration: Option<f64>,

    /// Preview config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Read the camera on a worker thread
    #[arg(long)]
    pub threaded: bool,
}

pub fn run(args: &PreviewArgs) -> Result<()> {
    let mut config = match args.config {
        Some(ref path) => PreviewConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PreviewConfig::default(),
    };
    if args.threaded {
        config.threaded_capture = true;
    }

    let filter = build_filter(args, &config)?;
    let request = match (&args.image, args.camera) {
        (Some(path), _) => SourceRequest::Static(path.clone()),
        (None, Some(index)) => SourceRequest::Live(index),
        (None, None) => bail!("Either --image or --camera is required"),
    };
    print_preview_summary(&config, &request, &filter);

    let opener = default_opener(&config);
    let mut scheduler = Scheduler::new(config)
        .with_opener(opener)
        .with_status_sink(print_status);
    scheduler.set_filter(filter);

    let label = request.to_string();
    scheduler
        .set_source(request)
        .with_context(|| format!("Failed to open {label}"))?;
    let limits = build_limits(args)?;

    if let Some(zoom) = args.zoom {
        scheduler.set_zoom(ViewportId::Original, zoom);
        scheduler.set_zoom(ViewportId::Filtered, zoom);
    }

    let summary = if scheduler.source().is_live() {
        let summary = run_ticks(&mut scheduler, &limits);
        info!(ticks = summary.ticks, failed = summary.failed, "Live preview finished");
        summary
    } else {
        RunSummary::default()
    };

    let original = scheduler.render(ViewportId::Original);
    let filtered = scheduler.render(ViewportId::Filtered);
    scheduler.stop();

    print_session_report(&scheduler.snapshot(), &summary, original.as_ref(), filtered.as_ref());
    Ok(())
}

/// Start from `--filter` (or the config's filter) and apply `--param` overrides.
fn build_filter(args: &PreviewArgs, config: &PreviewConfig) -> Result<FilterSpec> {
    let mut spec = match args.filter {
        Some(ref name) => {
            let kind: FilterKind = name
                .parse()
                .with_context(|| format!("Invalid --filter '{name}'"))?;
            FilterSpec::default_for(kind)
        }
        None => config.filter.clone(),
    };

    for param in &args.params {
        let (name, value) = param
            .split_once('=')
            .with_context(|| format!("Invalid --param '{param}' (expected name=value)"))?;
        let value: f64 = value
            .trim()
            .parse()
            .with_context(|| format!("Invalid value in --param '{param}'"))?;
        if let Some(notice) = spec
            .set_parameter(name.trim(), value)
            .with_context(|| format!("Invalid --param '{param}'"))?
        {
            eprintln!("  {}", Style::new().yellow().apply_to(notice));
        }
    }

    Ok(spec)
}

fn build_limits(args: &PreviewArgs) -> Result<RunLimits> {
    let deadline = match args.duration {
        Some(secs) => {
            let duration = Duration::try_from_secs_f64(secs)
                .with_context(|| format!("Invalid --duration {secs}"))?;
            Some(Instant::now() + duration)
        }
        None => None,
    };

    Ok(RunLimits {
        max_ticks: args.ticks,
        deadline,
        cancel: None,
    })
}

fn print_status(event: &StatusEvent) {
    match event {
        StatusEvent::FramePublished { .. } => {}
        StatusEvent::SourceError(_) => eprintln!("  {}", Style::new().red().apply_to(event)),
        StatusEvent::FilterAdjusted(_) => eprintln!("  {}", Style::new().yellow().apply_to(event)),
        _ => println!("  {}", Style::new().green().apply_to(event)),
    }
}
