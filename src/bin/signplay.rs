use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use signplay::{
    CaptureKind, ClipLibrary, CpuSurface, Driver, FrameData, JsonFileSource, LandmarkDrawer,
    Pacing, PlaybackController, PlayerConfig, SequenceSource, SignSequenceSet, SignplayError,
    Speed,
};

#[derive(Parser, Debug)]
#[command(name = "signplay", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame of a sequence set as a PNG.
    Frame(FrameArgs),
    /// Play a sequence set for a number of loops and write the captured video.
    Play(PlayArgs),
    /// Print statistics about a sequence set as JSON.
    Inspect(InspectArgs),
}

#[derive(clap::Args, Debug)]
struct InputArgs {
    /// Sequence set JSON (`{ "sequences": [...] }`).
    #[arg(long = "in", conflicts_with = "clips")]
    in_path: Option<PathBuf>,

    /// Clip library directory with one `<word>.json` per word; used with `--text`.
    #[arg(long)]
    clips: Option<PathBuf>,

    /// Input text. Selects clips with `--clips` and names the downloaded file.
    #[arg(long, default_value = "")]
    text: String,
}

impl InputArgs {
    fn source(&self) -> anyhow::Result<Box<dyn SequenceSource>> {
        match (&self.in_path, &self.clips) {
            (Some(path), _) => Ok(Box::new(JsonFileSource::new(path))),
            (None, Some(dir)) => Ok(Box::new(ClipLibrary::new(dir))),
            (None, None) => anyhow::bail!("either --in or --clips with --text is required"),
        }
    }

    fn load(&self) -> anyhow::Result<SignSequenceSet> {
        let set = self.source()?.fetch(&self.text)?;
        Ok(set)
    }
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Player configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Frame index (0-based) into the concatenated frames.
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CaptureArg {
    Auto,
    Mp4,
    Gif,
    Memory,
    Off,
}

impl From<CaptureArg> for CaptureKind {
    fn from(v: CaptureArg) -> Self {
        match v {
            CaptureArg::Auto => CaptureKind::Auto,
            CaptureArg::Mp4 => CaptureKind::Mp4,
            CaptureArg::Gif => CaptureKind::Gif,
            CaptureArg::Memory => CaptureKind::Memory,
            CaptureArg::Off => CaptureKind::Off,
        }
    }
}

#[derive(Parser, Debug)]
struct PlayArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Player configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Speed multiplier (overrides the configuration).
    #[arg(long)]
    speed: Option<f64>,

    /// Capture backend (overrides the configuration).
    #[arg(long, value_enum)]
    capture: Option<CaptureArg>,

    /// Loop passes to play before stopping.
    #[arg(long, default_value_t = 1)]
    loops: u64,

    /// Directory the captured video is written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Run on virtual time instead of sleeping between frames.
    #[arg(long = "virtual", default_value_t = false)]
    virtual_time: bool,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Player configuration JSON, for the duration estimate.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Play(args) => cmd_play(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PlayerConfig> {
    match path {
        Some(p) => Ok(PlayerConfig::from_path(p)?),
        None => Ok(PlayerConfig::default()),
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let frames = args.input.load()?.into_frames();
    let frame = frames.get(args.frame as usize).with_context(|| {
        format!(
            "frame {} out of range ({} frames)",
            args.frame,
            frames.len()
        )
    })?;

    let mut surface = CpuSurface::new(cfg.canvas)?;
    let stats = LandmarkDrawer::new(cfg.style).render(&mut surface, frame)?;
    let snap = surface.snapshot();

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &snap.data,
        snap.width,
        snap.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({} points, {} connections)",
        args.out.display(),
        stats.points,
        stats.connections
    );
    Ok(())
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(speed) = args.speed {
        cfg.speed = Speed::new(speed)?;
    }
    if let Some(capture) = args.capture {
        cfg.capture = capture.into();
    }
    if args.loops == 0 {
        anyhow::bail!("--loops must be at least 1");
    }

    let mut ctl = PlaybackController::from_config(&cfg)?;
    let mut driver = Driver::new(if args.virtual_time {
        Pacing::Virtual
    } else {
        Pacing::RealTime
    });

    let mut source = args.input.source()?;
    ctl.begin_loading()?;
    let fetched = source.fetch(&args.input.text);
    ctl.apply_fetch(fetched, driver.now())?;
    if ctl.snapshot().total_frames == 0 {
        anyhow::bail!("sequence set has no frames");
    }

    let loops = args.loops;
    let ticks = driver.run(&mut ctl, |snap, _| snap.loops_completed >= loops);
    ctl.stop()?;
    ctl.wait_idle();

    match ctl.download(&args.input.text) {
        Ok(dl) => {
            std::fs::create_dir_all(&args.out_dir)
                .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
            let out = args.out_dir.join(&dl.file_name);
            std::fs::write(&out, &dl.artifact.bytes)
                .with_context(|| format!("write capture '{}'", out.display()))?;
            eprintln!(
                "played {ticks} frames; wrote {} ({} frames, {})",
                out.display(),
                dl.artifact.frame_count,
                dl.artifact.format.mime()
            );
        }
        Err(SignplayError::NothingToDownload) => {
            eprintln!("played {ticks} frames; no capture available, nothing written");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let set = args.input.load()?;

    let total = set.total_frames();
    let rate = cfg.base_fps.as_f64() * cfg.speed.get();
    let report = serde_json::json!({
        "sequences": set.sequences.iter().map(|s| s.len()).collect::<Vec<_>>(),
        "total_frames": total,
        "fps": rate,
        "loop_seconds": total as f64 / rate,
        "frames_with_pose": count(&set, |f| !f.pose.is_empty()),
        "frames_with_left_hand": count(&set, |f| !f.left_hand.is_empty()),
        "frames_with_right_hand": count(&set, |f| !f.right_hand.is_empty()),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn count(set: &SignSequenceSet, pred: impl Fn(&FrameData) -> bool) -> usize {
    set.sequences
        .iter()
        .flat_map(|s| &s.frames)
        .filter(|f| pred(f))
        .count()
}
