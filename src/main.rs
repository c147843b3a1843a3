use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ledcam_rs::color_pipeline::{
    ColorPipeline, DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH, DEFAULT_PWM_MAX, FrameSource,
    PipelineConfig, SampleRegion, SnapshotCompression, SyntheticSource, TiffSequenceSource,
    TiffSnapshotWriter,
};
use ledcam_rs::led::{DryRunActuator, LedActuator, SysfsPwmActuator, SysfsPwmConfig};
use ledcam_rs::logger;
use ledcam_rs::runtime::{LoopSettings, Supervisor};
use tracing::{error, info, warn};

/// Frame pacing of the synthetic source, roughly a 30 fps camera.
const SYNTHETIC_FRAME_INTERVAL: Duration = Duration::from_millis(33);

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Compression {
    None,
    Lzw,
    Deflate,
}

impl From<Compression> for SnapshotCompression {
    fn from(value: Compression) -> Self {
        match value {
            Compression::None => SnapshotCompression::None,
            Compression::Lzw => SnapshotCompression::Lzw,
            Compression::Deflate => SnapshotCompression::Deflate,
        }
    }
}

/// Drive RGB LEDs with the average color seen by a camera.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Save one snapshot, play the LED test sequence and exit
    #[arg(short, long)]
    test: bool,

    /// Value written for a fully lit channel
    #[arg(long, default_value_t = DEFAULT_PWM_MAX)]
    pwm_max_value: f64,

    #[arg(long, default_value_t = 1.0)]
    red_balance: f64,

    #[arg(long, default_value_t = 1.0)]
    green_balance: f64,

    #[arg(long, default_value_t = 1.0)]
    blue_balance: f64,

    /// Sampled area as fractions of the frame: V_START,V_END,H_START,H_END
    #[arg(long, value_parser = parse_region, default_value = "0.25,0.75,0.25,0.75")]
    region: SampleRegion,

    /// Fade toward new colors by this fraction of the PWM range per tick
    #[arg(long)]
    fade_step: Option<f64>,

    /// Milliseconds between LED updates
    #[arg(long, default_value_t = 10)]
    tick_ms: u64,

    /// TIFF file or directory of TIFF files to replay instead of the test pattern
    #[arg(long)]
    frames: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_FRAME_WIDTH)]
    frame_width: usize,

    #[arg(long, default_value_t = DEFAULT_FRAME_HEIGHT)]
    frame_height: usize,

    /// sysfs pwmchip directory driving the LEDs
    #[arg(long)]
    pwm_chip: Option<PathBuf>,

    #[arg(long, default_value_t = 0)]
    red_channel: u32,

    #[arg(long, default_value_t = 1)]
    green_channel: u32,

    #[arg(long, default_value_t = 2)]
    blue_channel: u32,

    /// PWM period in nanoseconds
    #[arg(long, default_value_t = 1_000_000)]
    period_ns: u64,

    /// Log LED colors instead of driving hardware, even with --pwm-chip
    #[arg(long)]
    dry_run: bool,

    /// Snapshot written in test mode
    #[arg(long, default_value = "test.tiff")]
    snapshot: PathBuf,

    #[arg(long, value_enum, default_value_t = Compression::None)]
    snapshot_compression: Compression,

    /// Seconds each test-sequence color is held
    #[arg(long, value_parser = parse_seconds, default_value = "1.0")]
    test_duration: Duration,
}

fn parse_region(value: &str) -> Result<SampleRegion, String> {
    let bounds = value
        .split(',')
        .map(|part| part.trim().parse::<f64>().map_err(|e| format!("{part:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    let [v_start, v_end, h_start, h_end] = bounds[..] else {
        return Err(format!("expected four values, got {}", bounds.len()));
    };
    SampleRegion::new(v_start, v_end, h_start, h_end).map_err(|e| e.to_string())
}

fn parse_seconds(value: &str) -> Result<Duration, String> {
    let seconds = value.parse::<f64>().map_err(|e| e.to_string())?;
    Duration::try_from_secs_f64(seconds).map_err(|e| e.to_string())
}

fn open_source(args: &Args) -> Result<Box<dyn FrameSource>> {
    match &args.frames {
        Some(path) => {
            let source = TiffSequenceSource::open(path)
                .with_context(|| format!("Failed to open frames at {}", path.display()))?;
            info!(frames = source.files().len(), "Replaying TIFF frames");
            Ok(Box::new(source))
        }
        None => {
            let source = SyntheticSource::test_pattern(args.frame_height, args.frame_width)
                .context("Failed to open the test-pattern source")?
                .with_frame_interval(SYNTHETIC_FRAME_INTERVAL);
            info!(
                width = args.frame_width,
                height = args.frame_height,
                "Using test-pattern frames"
            );
            Ok(Box::new(source))
        }
    }
}

fn open_actuator(args: &Args) -> Result<Box<dyn LedActuator>> {
    match &args.pwm_chip {
        Some(chip) if !args.dry_run => {
            let config = SysfsPwmConfig {
                chip: chip.clone(),
                channels: [args.red_channel, args.green_channel, args.blue_channel],
                period_ns: args.period_ns,
            };
            let actuator = SysfsPwmActuator::open(config, args.pwm_max_value)
                .with_context(|| format!("Failed to open PWM chip {}", chip.display()))?;
            Ok(Box::new(actuator))
        }
        _ => {
            info!("Dry run, LED colors are only logged");
            Ok(Box::new(DryRunActuator::new(args.pwm_max_value)?))
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = PipelineConfig::builder()
        .region(args.region)
        .balance(args.red_balance, args.green_balance, args.blue_balance)
        .pwm_max(args.pwm_max_value)
        .build()
        .context("Invalid pipeline configuration")?;
    let pipeline = ColorPipeline::new(config)?;
    let settings = LoopSettings {
        fade_step: args.fade_step,
        actuation_tick: Duration::from_millis(args.tick_ms),
        ..LoopSettings::default()
    };

    let source = open_source(&args)?;
    let actuator = open_actuator(&args)?;
    let mut supervisor = Supervisor::new(pipeline, source, actuator, settings)?;

    if args.test {
        let writer = TiffSnapshotWriter::new(args.snapshot_compression.into());
        supervisor
            .run_test_mode(&writer, &args.snapshot, args.test_duration)
            .context("Test mode failed")?;
        info!(snapshot = %args.snapshot.display(), "Test mode complete");
        return Ok(());
    }

    let signal = supervisor.shutdown_signal();
    ctrlc::set_handler(move || {
        signal.trigger();
    })
    .context("Failed to install the interrupt handler")?;

    info!("Press Ctrl-C to stop");
    let report = supervisor.run().context("Controller stopped with an error")?;
    info!(
        published = report.sampling.completed(),
        writes = report.actuation.completed(),
        last = ?report.last_published.color,
        "Controller stopped"
    );
    if report.sampling.failures() > 0 {
        warn!(failures = report.sampling.failures(), "Some frames could not be captured");
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    logger::init(args.verbose);

    info!("Starting ledcam...");

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
