mod capture;

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
    thread,
    time::Duration,
};

use clap::{Args, Parser, Subcommand, ValueEnum};
use spectrum_visualiser_core::{
    snapshot_handoff, Anchor, AppConfig, Result, Shape, SnapshotWriter, TargetRect,
    VisualiserError, Visualizer,
};
use tracing_subscriber::EnvFilter;

use crate::capture::{FftEncoder, ToneCapture};

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => run_render(args),
        Commands::Defaults { output } => write_defaults(output.as_ref()),
    }
}

fn run_render(args: RenderArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    let mut visualizer = Visualizer::new(config);
    apply_overrides(&mut visualizer, &args)?;
    tracing::info!(?visualizer, frames = args.frames, "starting render");

    let rect = TargetRect::new(args.width, args.height);
    let mut encoder = FftEncoder::new(args.capture_size, args.gain)?;
    let tone = ToneCapture::new(args.tones.clone(), args.sample_rate);
    let interval = Duration::from_millis(args.interval_ms);

    let (writer, reader) = snapshot_handoff();
    let frames = args.frames;
    let producer = thread::spawn(move || run_capture(writer, tone, &mut encoder, frames, interval));

    let mut out = open_output(args.output.as_ref())?;
    let mut rendered = 0_u64;
    loop {
        if let Some(frame) = reader.take_latest()? {
            let output = visualizer.render(&frame, rect)?;
            serde_json::to_writer(&mut out, &output)?;
            writeln!(out)?;
            rendered += 1;
        } else if reader.is_finished()? {
            break;
        } else {
            thread::sleep(Duration::from_millis(1));
        }
    }
    out.flush()?;

    producer
        .join()
        .map_err(|_| VisualiserError::msg("capture thread panicked"))??;

    tracing::info!(
        rendered,
        skipped = reader.overwritten()?,
        "render finished"
    );
    Ok(())
}

fn run_capture(
    writer: SnapshotWriter,
    mut tone: ToneCapture,
    encoder: &mut FftEncoder,
    frames: u64,
    interval: Duration,
) -> Result<()> {
    for _ in 0..frames {
        let block = tone.next_block(encoder.capture_size());
        writer.publish(encoder.encode(&block)?)?;
        thread::sleep(interval);
    }
    tracing::debug!(frames, "capture finished");
    Ok(())
}

fn apply_overrides(visualizer: &mut Visualizer, args: &RenderArgs) -> Result<()> {
    if let Some(columns) = args.columns {
        visualizer.set_column_count(columns)?;
    }
    if let Some(anchor) = args.anchor {
        visualizer.set_anchor(anchor.into());
    }
    if let Some(scale) = args.scale {
        visualizer.set_scale(scale)?;
    }
    if let Some(shape) = args.shape {
        visualizer.set_shape(shape.into());
    }
    if let Some(fade_alpha) = args.fade_alpha {
        visualizer.set_fade_alpha(fade_alpha)?;
    }
    Ok(())
}

fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn write_defaults(output: Option<&PathBuf>) -> Result<()> {
    let json = AppConfig::default().to_json_pretty()?;
    match output {
        Some(path) => {
            tracing::info!(?path, "writing default configuration");
            std::fs::write(path, json)?;
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Audio spectrum to geometry renderer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render synthetic tones and print one JSON frame per line.
    Render(RenderArgs),
    /// Print the default configuration as JSON.
    Defaults {
        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// JSON configuration file; command line options override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    columns: Option<usize>,
    #[arg(long, value_enum)]
    anchor: Option<AnchorArg>,
    /// Vertical exaggeration multiplier.
    #[arg(long)]
    scale: Option<f32>,
    #[arg(long, value_enum)]
    shape: Option<ShapeArg>,
    #[arg(long)]
    fade_alpha: Option<f32>,
    #[arg(long, default_value_t = 1080.0)]
    width: f32,
    #[arg(long, default_value_t = 480.0)]
    height: f32,
    /// Tone frequencies in Hz; repeat for a chord.
    #[arg(long = "tone", default_values_t = [220.0_f32, 880.0, 3_520.0])]
    tones: Vec<f32>,
    #[arg(long, default_value_t = 44_100)]
    sample_rate: u32,
    /// Samples per captured block; the FFT snapshot has the same byte length.
    #[arg(long, default_value_t = 1024)]
    capture_size: usize,
    /// Extra gain applied before quantising FFT values to 8 bits.
    #[arg(long, default_value_t = 4.0)]
    gain: f32,
    #[arg(long, default_value_t = 60)]
    frames: u64,
    #[arg(long, default_value_t = 16)]
    interval_ms: u64,
    /// Write frames to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum AnchorArg {
    Top,
    Bottom,
    Middle,
}

impl From<AnchorArg> for Anchor {
    fn from(value: AnchorArg) -> Self {
        match value {
            AnchorArg::Top => Anchor::Top,
            AnchorArg::Bottom => Anchor::Bottom,
            AnchorArg::Middle => Anchor::Middle,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ShapeArg {
    Bar,
    Block,
}

impl From<ShapeArg> for Shape {
    fn from(value: ShapeArg) -> Self {
        match value {
            ShapeArg::Bar => Shape::Bar,
            ShapeArg::Block => Shape::Block,
        }
    }
}
