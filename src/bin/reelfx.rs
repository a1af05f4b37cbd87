use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "reelfx", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply one effect to an input and write the result.
    Apply(ApplyArgs),
    /// Print stream info for a video (requires `ffprobe` on PATH).
    Probe(ProbeArgs),
}

#[derive(Parser, Debug)]
struct ApplyArgs {
    /// Effect kind: reverse, fadeInOut, motionBlur, earthquake (jitter) or crossFade.
    #[arg(long)]
    effect: String,

    /// Input: a directory of images or a video file.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Second input (crossFade only).
    #[arg(long = "in2")]
    in2_path: Option<PathBuf>,

    /// Output: an `.mp4` file or a directory for a PNG sequence.
    #[arg(long)]
    out: PathBuf,

    /// Output kind. `auto` picks MP4 for `.mp4` paths and PNGs otherwise.
    #[arg(long, value_enum, default_value_t = OutputChoice::Auto)]
    format: OutputChoice,

    /// Frame rate of image-directory inputs, e.g. `30` or `30000/1001`.
    #[arg(long)]
    fps: Option<String>,

    /// Effect parameters as a JSON object. Individual flags below override keys.
    #[arg(long)]
    params: Option<String>,

    /// Fade-in length in seconds (fadeInOut).
    #[arg(long)]
    fade_in: Option<f64>,

    /// Fade-out length in seconds (fadeInOut).
    #[arg(long)]
    fade_out: Option<f64>,

    /// Window size in frames (motionBlur).
    #[arg(long)]
    blur_frames: Option<u32>,

    /// Shake strength in pixels (earthquake).
    #[arg(long)]
    strength: Option<u32>,

    /// RNG seed for reproducible shake (earthquake).
    #[arg(long)]
    seed: Option<u64>,

    /// Transition length in seconds (crossFade).
    #[arg(long)]
    duration: Option<f64>,

    /// Fail instead of replacing an existing MP4.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,
}

#[derive(Parser, Debug)]
struct ProbeArgs {
    /// Video file to inspect.
    path: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputChoice {
    Auto,
    Png,
    Mp4,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Apply(args) => cmd_apply(args),
        Command::Probe(args) => cmd_probe(args),
    }
}

fn cmd_apply(args: ApplyArgs) -> anyhow::Result<()> {
    let inst = effect_instance(&args)?;
    let spec = reelfx::parse_effect(&inst)?;

    let fps_override = args
        .fps
        .as_deref()
        .map(reelfx::Fps::parse)
        .transpose()?;
    let (primary, fps) = load_input(&args.in_path, fps_override)?;
    let mut inputs = reelfx::Inputs::new(primary, fps);
    if spec.requires_secondary() {
        let path = args
            .in2_path
            .as_deref()
            .context("this effect needs a second input (--in2)")?;
        let (secondary, _) = load_input(path, Some(fps))?;
        inputs = inputs.with_secondary(secondary);
    }

    let effect = reelfx::build_effect(&spec);
    let format = match args.format {
        OutputChoice::Auto if has_extension(&args.out, "mp4") => OutputChoice::Mp4,
        OutputChoice::Auto => OutputChoice::Png,
        other => other,
    };

    match format {
        OutputChoice::Mp4 => {
            let asm = reelfx::Mp4Assembler::new(&args.out).overwrite(!args.no_overwrite);
            let path = finish(run(asm, effect, inputs)?)?;
            eprintln!("wrote {}", path.display());
        }
        _ => {
            let asm = reelfx::PngSequenceAssembler::new(&args.out);
            let paths = finish(run(asm, effect, inputs)?)?;
            eprintln!("wrote {} frames to {}", paths.len(), args.out.display());
        }
    }
    Ok(())
}

fn cmd_probe(args: ProbeArgs) -> anyhow::Result<()> {
    let info = reelfx::probe_video(&args.path)?;
    println!("path: {}", info.source_path.display());
    println!("size: {}x{}", info.width, info.height);
    println!("fps: {}", info.fps);
    println!("duration: {:.3}s", info.duration_sec);
    println!("frames (estimated): {}", info.estimated_frames());
    Ok(())
}

fn effect_instance(args: &ApplyArgs) -> anyhow::Result<reelfx::EffectInstance> {
    let mut params = match args.params.as_deref() {
        Some(s) => serde_json::from_str::<serde_json::Value>(s).context("parse --params JSON")?,
        None => serde_json::json!({}),
    };
    let obj = params
        .as_object_mut()
        .context("--params must be a JSON object")?;

    let overrides = [
        ("fade_in_secs", args.fade_in.map(serde_json::Value::from)),
        ("fade_out_secs", args.fade_out.map(serde_json::Value::from)),
        ("blur_frames", args.blur_frames.map(serde_json::Value::from)),
        ("strength", args.strength.map(serde_json::Value::from)),
        ("seed", args.seed.map(serde_json::Value::from)),
        ("duration_secs", args.duration.map(serde_json::Value::from)),
    ];
    for (key, value) in overrides {
        if let Some(v) = value {
            obj.insert(key.to_owned(), v);
        }
    }

    Ok(reelfx::EffectInstance::new(args.effect.clone(), params))
}

/// A directory of images (decoded lazily), or a video file decoded through `ffmpeg`.
fn load_input(
    path: &Path,
    fps_override: Option<reelfx::Fps>,
) -> anyhow::Result<(Box<dyn reelfx::FrameSource>, reelfx::Fps)> {
    if path.is_dir() {
        let encoded = reelfx::EncodedSequence::from_dir(path)?;
        return Ok((Box::new(encoded), fps_override.unwrap_or_default()));
    }

    let (seq, fps) = reelfx::decode_video(path)
        .with_context(|| format!("decode video '{}'", path.display()))?;
    Ok((Box::new(seq), fps_override.unwrap_or(fps)))
}

fn run<A: reelfx::OutputAssembler>(
    assembler: A,
    effect: Box<dyn reelfx::Effect>,
    inputs: reelfx::Inputs,
) -> anyhow::Result<reelfx::Outcome<A::Artifact>> {
    let mut scheduler = reelfx::Scheduler::new(assembler, reelfx::ProgressLog::default());
    Ok(scheduler.run(effect, inputs)?)
}

fn finish<T>(outcome: reelfx::Outcome<T>) -> anyhow::Result<T> {
    match outcome {
        reelfx::Outcome::Finished { artifact, .. } => Ok(artifact),
        reelfx::Outcome::Cancelled(stats) => anyhow::bail!(
            "cancelled after {} of {} frames",
            stats.completed_frames,
            stats.output_duration
        ),
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}
