use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use ring_align::augmentation::{noise_sweep, NoiseKind, ProfileNoise};
use ring_align::config::{load_config_or_default, AlignmentConfig, Config, Strategy};
use ring_align::logging::{init_logging, LoggingConfig};
use ring_align::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ringalign")]
#[command(about = "Rotation alignment for concentric-ring captcha images")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML or JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the rotation of the inner disk in a captcha image
    Solve {
        image: PathBuf,

        #[command(flatten)]
        overrides: AlignmentOverrides,

        /// Also emit profiles, their difference and derivatives
        #[arg(long)]
        diagnostics: bool,

        /// Write the JSON report here instead of only printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the configured strategy on gray, R, G and B separately
    Channels {
        image: PathBuf,

        #[command(flatten)]
        overrides: AlignmentOverrides,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render fixtures with a known disk rotation
    Render {
        /// Unrotated source image
        source: PathBuf,

        /// Radius of the rotated disk in pixels
        #[arg(short, long)]
        radius: u32,

        /// Angle increment in degrees
        #[arg(short, long, default_value = "10")]
        step: u32,

        #[arg(short, long, default_value = "fixtures")]
        out_dir: PathBuf,

        /// Disk center, defaults to the image center
        #[arg(long, num_args = 2, value_names = ["X", "Y"])]
        center: Option<Vec<u32>>,
    },

    /// Score a directory of rotated_NNNdeg fixtures against their angles
    Sweep {
        dir: PathBuf,

        #[command(flatten)]
        overrides: AlignmentOverrides,

        /// Largest error in degrees still counted as a hit
        #[arg(short, long, default_value = "1.0")]
        tolerance: f64,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Time brute force against FFT on one image
    CompareMethods {
        image: PathBuf,

        #[command(flatten)]
        overrides: AlignmentOverrides,

        #[arg(short, long, default_value = "5")]
        repetitions: usize,
    },

    /// Align the image with increasing noise added to the inner profile
    Noise {
        image: PathBuf,

        #[command(flatten)]
        overrides: AlignmentOverrides,

        #[arg(long)]
        seed: Option<u64>,

        /// uniform or gaussian
        #[arg(long)]
        kind: Option<NoiseKind>,

        /// Noise half-widths, comma-separated
        #[arg(long, value_delimiter = ',')]
        amplitudes: Option<Vec<f64>>,
    },
}

/// Command-line values that take precedence over the configuration file.
#[derive(Args, Default)]
struct AlignmentOverrides {
    #[arg(long)]
    inner_diameter: Option<u32>,

    #[arg(long)]
    outer_diameter: Option<u32>,

    #[arg(short = 'n', long)]
    num_points: Option<usize>,

    /// gray, R, G or B
    #[arg(long)]
    channel: Option<Channel>,

    #[arg(long)]
    threshold: Option<f64>,

    /// point or sector
    #[arg(long)]
    strategy: Option<Strategy>,

    /// fft or brute-force
    #[arg(long)]
    method: Option<ScoringMethod>,

    #[arg(long)]
    sectors: Option<usize>,

    #[arg(long, num_args = 2, value_names = ["X", "Y"])]
    center: Option<Vec<f64>>,

    /// Include the full per-shift score curve in the output
    #[arg(long)]
    curve: bool,
}

impl AlignmentOverrides {
    fn apply(&self, mut config: AlignmentConfig) -> AlignmentConfig {
        if let Some(v) = self.inner_diameter {
            config.inner_diameter = v;
        }
        if let Some(v) = self.outer_diameter {
            config.outer_diameter = v;
        }
        if let Some(v) = self.num_points {
            config.num_points = v;
        }
        if let Some(v) = self.channel {
            config.channel = v;
        }
        if let Some(v) = self.threshold {
            config.similarity_threshold = v;
        }
        if let Some(v) = self.strategy {
            config.strategy = v;
        }
        if let Some(v) = self.method {
            config.method = v;
        }
        if let Some(v) = self.sectors {
            config.sector_count = v;
        }
        if let Some(ref c) = self.center {
            config.center = Some((c[0], c[1]));
        }
        if self.curve {
            config.include_score_curve = true;
        }
        config
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config_or_default(cli.config.as_deref())
        .with_context(|| format!("Failed to load configuration {:?}", cli.config))?;

    let logging = if cli.config.is_some() {
        config.logging.clone()
    } else {
        LoggingConfig::quiet()
    };
    let _guard =
        init_logging(&logging.with_verbosity(cli.verbose)).context("Failed to initialise logging")?;

    match cli.command {
        Commands::Solve {
            image,
            overrides,
            diagnostics,
            output,
        } => handle_solve(&config, image, &overrides, diagnostics, output.as_deref()),
        Commands::Channels { image, overrides, output } => {
            handle_channels(&config, image, &overrides, output.as_deref())
        }
        Commands::Render {
            source,
            radius,
            step,
            out_dir,
            center,
        } => handle_render(source, radius, step, out_dir, center),
        Commands::Sweep {
            dir,
            overrides,
            tolerance,
            output,
        } => handle_sweep(&config, dir, &overrides, tolerance, output.as_deref()),
        Commands::CompareMethods {
            image,
            overrides,
            repetitions,
        } => handle_compare_methods(&config, image, &overrides, repetitions),
        Commands::Noise {
            image,
            overrides,
            seed,
            kind,
            amplitudes,
        } => handle_noise(&config, image, &overrides, seed, kind, amplitudes),
    }
}

fn build_aligner(config: &Config, overrides: &AlignmentOverrides) -> anyhow::Result<RingAligner> {
    let alignment = overrides.apply(config.alignment.clone());
    RingAligner::new(alignment).context("Invalid alignment configuration")
}

fn load_image(path: &Path) -> anyhow::Result<Image> {
    load(path).with_context(|| format!("Failed to load image {}", path.display()))
}

/// Print `value` as pretty JSON and optionally save it.
fn emit<T: Serialize>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    if let Some(path) = output {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &json).with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "Report written");
    }
    println!("{json}");
    Ok(())
}

#[derive(Serialize)]
struct SolveOutput {
    #[serde(flatten)]
    report: AlignmentReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostics: Option<ProfileDiagnostics>,
}

fn handle_solve(
    config: &Config,
    image_path: PathBuf,
    overrides: &AlignmentOverrides,
    diagnostics: bool,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let aligner = build_aligner(config, overrides)?;
    let image = load_image(&image_path)?;

    let report = aligner.solve(&image)?;
    let diagnostics = if diagnostics {
        Some(aligner.diagnostics(&image)?)
    } else {
        None
    };

    emit(&SolveOutput { report, diagnostics }, output)
}

fn handle_channels(
    config: &Config,
    image_path: PathBuf,
    overrides: &AlignmentOverrides,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let aligner = build_aligner(config, overrides)?;
    let image = load_image(&image_path)?;
    let reports = aligner.channel_report(&image)?;
    emit(&reports, output)
}

fn handle_render(
    source_path: PathBuf,
    radius: u32,
    step: u32,
    out_dir: PathBuf,
    center: Option<Vec<u32>>,
) -> anyhow::Result<()> {
    let source = load_image(&source_path)?;
    let renderer = match center {
        Some(c) => RotationRenderer::with_center(&source, (c[0], c[1]), radius)?,
        None => RotationRenderer::new(&source, radius)?,
    };

    let written = renderer
        .write_fixtures(&out_dir, step)
        .with_context(|| format!("Failed to write fixtures into {}", out_dir.display()))?;
    tracing::info!(count = written.len(), dir = %out_dir.display(), "Fixtures rendered");
    emit(&written, None)
}

fn handle_sweep(
    config: &Config,
    dir: PathBuf,
    overrides: &AlignmentOverrides,
    tolerance: f64,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let aligner = build_aligner(config, overrides)?;
    let report = FixtureSweep::new(aligner)
        .with_tolerance(tolerance)
        .run_dir(&dir)
        .with_context(|| format!("Fixture sweep over {} failed", dir.display()))?;
    emit(&report, output)
}

fn handle_compare_methods(
    config: &Config,
    image_path: PathBuf,
    overrides: &AlignmentOverrides,
    repetitions: usize,
) -> anyhow::Result<()> {
    let aligner = build_aligner(config, overrides)?;
    let image = load_image(&image_path)?;
    let (inner, outer) = aligner.profiles(&image, aligner.config().channel)?;

    let comparison = BenchmarkRunner::new().with_repetitions(repetitions).run(&inner, &outer)?;
    if !comparison.shifts_agree {
        tracing::warn!(
            max_score_difference = comparison.max_score_difference,
            "Scoring methods disagree on the best shift"
        );
    }
    emit(&comparison, None)
}

fn handle_noise(
    config: &Config,
    image_path: PathBuf,
    overrides: &AlignmentOverrides,
    seed: Option<u64>,
    kind: Option<NoiseKind>,
    amplitudes: Option<Vec<f64>>,
) -> anyhow::Result<()> {
    let aligner = build_aligner(config, overrides)?;
    let image = load_image(&image_path)?;
    let (inner, outer) = aligner.profiles(&image, aligner.config().channel)?;

    let noise = ProfileNoise::new(seed.unwrap_or(config.noise.seed))
        .with_kind(kind.unwrap_or(config.noise.kind));
    let amplitudes = amplitudes.unwrap_or_else(|| config.noise.amplitudes.clone());
    let points = noise_sweep(&inner, &outer, &amplitudes, &noise, aligner.config().method)?;
    emit(&points, None)
}
