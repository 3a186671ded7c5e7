use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Local;
use clap::{Parser, ValueEnum};
use env_logger::Builder;
use glob::glob;
use log::LevelFilter;
use rayon::iter::{IntoParallelRefIterator as _, ParallelIterator as _};
use thiserror::Error;

use pcd_core::pointcloud::point::{BoundingVolume, Channels};
use pcd_parser::{load, DecodeError, FormatHint};

#[derive(Parser, Debug)]
#[command(
    name = "pcdinfo",
    about = "Decodes point cloud captures (PCD or xyzi .bin) and reports their contents",
    author = "MIERUNE Inc.",
    version = "0.0.1"
)]
struct Cli {
    #[arg(short, long, required = true, num_args = 1.., value_name = "FILE")]
    input: Vec<String>,

    /// Writes each decoded point set as <stem>.json into this directory
    #[arg(short, long, value_name = "DIR")]
    output: Option<String>,

    /// Overrides the format derived from the file extension
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Pcd,
    PcdAscii,
    Bin,
}

impl From<FormatArg> for FormatHint {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Pcd => FormatHint::HeaderedBinary,
            FormatArg::PcdAscii => FormatHint::HeaderedText,
            FormatArg::Bin => FormatHint::DenseRecord,
        }
    }
}

#[derive(Debug, Error)]
enum AppError {
    #[error("invalid input pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    #[error("{}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug)]
struct Summary {
    path: PathBuf,
    points: usize,
    channels: Channels,
    bounding_volume: Option<BoundingVolume>,
}

fn expand_globs(input_patterns: Vec<String>) -> Result<Vec<PathBuf>, AppError> {
    let mut paths = Vec::new();
    for pattern in input_patterns {
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            for entry in glob(&pattern)? {
                match entry {
                    Ok(path) => paths.push(path),
                    Err(e) => log::warn!("skipping unreadable match: {:?}", e),
                }
            }
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }
    Ok(paths)
}

fn hint_for(path: &Path, format: Option<FormatArg>) -> FormatHint {
    match format {
        Some(format) => format.into(),
        None => FormatHint::from_resource_name(&path.to_string_lossy()),
    }
}

fn describe_channels(channels: Channels) -> String {
    let mut names = vec!["position"];
    for (present, name) in [
        (channels.intensity, "intensity"),
        (channels.color, "color"),
        (channels.normal, "normal"),
        (channels.velocity, "velocity"),
    ] {
        if present {
            names.push(name);
        }
    }
    names.join(", ")
}

fn process_file(
    path: &Path,
    format: Option<FormatArg>,
    output_dir: Option<&Path>,
) -> Result<Summary, AppError> {
    let raw = fs::read(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let hint = hint_for(path, format);
    let points = load(&raw, hint).map_err(|source| AppError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(dir) = output_dir {
        let stem = path.file_stem().unwrap_or(path.as_os_str());
        let json_path = dir.join(format!("{}.json", stem.to_string_lossy()));
        let json = serde_json::to_vec(&points).map_err(|source| AppError::Json {
            path: json_path.clone(),
            source,
        })?;
        fs::write(&json_path, json).map_err(|source| AppError::Io {
            path: json_path.clone(),
            source,
        })?;
        log::debug!("wrote {:?}", json_path);
    }

    Ok(Summary {
        path: path.to_path_buf(),
        points: points.len(),
        channels: points.channels(),
        bounding_volume: points.bounding_volume(),
    })
}

fn run(args: Cli) -> Result<usize, AppError> {
    let input_files = expand_globs(args.input)?;
    log::info!("Expanded input files: {:?}", input_files);

    let output_path = args.output.map(PathBuf::from);
    if let Some(dir) = &output_path {
        fs::create_dir_all(dir).map_err(|source| AppError::Io {
            path: dir.clone(),
            source,
        })?;
    }

    let start = std::time::Instant::now();
    let results: Vec<Result<Summary, AppError>> = input_files
        .par_iter()
        .map(|path| process_file(path, args.format, output_path.as_deref()))
        .collect();

    let mut failures = 0;
    for result in results {
        match result {
            Ok(summary) => {
                log::info!(
                    "{}: {} points [{}]",
                    summary.path.display(),
                    summary.points,
                    describe_channels(summary.channels)
                );
                if let Some(bounds) = summary.bounding_volume {
                    log::info!("  bounds min {:?} max {:?}", bounds.min, bounds.max);
                }
            }
            Err(e) => {
                log::error!("Failed to decode point cloud: {}", e);
                failures += 1;
            }
        }
    }
    log::info!("Elapsed: {:?}", start.elapsed());

    Ok(failures)
}

fn main() -> ExitCode {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Cli::parse();
    log::info!("input files: {:?}", args.input);

    match run(args) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failures) => {
            log::error!("{} input(s) failed", failures);
            ExitCode::FAILURE
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
