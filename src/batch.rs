//! Shared palette conversion of a directory of PNG files.
//!
//! Every source image is decoded first and fed into one histogram, the
//! histogram is quantized once and each image is then remapped to that palette
//! and written as an 8-bit indexed PNG. Decoding, accumulation and writing run
//! on a rayon pool. The first error aborts the run.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::codec::{self, DecodeError, DecodedImage, EncodeError};
use crate::error::Error;
use crate::histogram::Histogram;
use crate::image::Image;
use crate::options::Options;
use crate::quantize::QuantizeResult;

const SOURCE_EXTENSION: &str = "png";

#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    #[error("Source directory {} is not readable", .path.display())]
    InputNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error loading file {}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
    #[error("Error creating histogram")]
    Quantize(#[source] Error),
    #[error("Can't encode image {}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: EncodeError,
    },
    #[error("Unable to write to {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Can't start worker threads")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl BatchError {
    /// Process exit status, following sysexits.h
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InputNotFound { .. } => 66,
            Self::Decode { .. } => 74,
            Self::Quantize(_) => 65,
            Self::Encode { .. } => 70,
            Self::Write { .. } => 73,
            Self::ThreadPool(_) => 71,
        }
    }
}

/// What to convert and how
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub options: Options,
    /// Worker threads, all cores when `None`
    pub jobs: Option<usize>,
}

impl BatchConfig {
    pub fn new(source: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
            options: Options::default(),
            jobs: None,
        }
    }
}

/// A decoded source file
pub struct SourceImage {
    pub path: PathBuf,
    pub pixels: DecodedImage,
}

impl SourceImage {
    pub fn image(&self) -> Result<Image<'_>, BatchError> {
        self.pixels.as_image().map_err(BatchError::Quantize)
    }
}

/// Outcome of a successful run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Written files in source order
    pub written: Vec<PathBuf>,
    pub palette_len: usize,
    pub quantization_error: f32,
}

/// Lists `*.png` files directly inside `dir`, sorted by path
pub fn scan(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let not_found = |source| BatchError::InputNotFound { path: dir.to_path_buf(), source };

    let mut paths = Vec::new();

    for entry in fs::read_dir(dir).map_err(not_found)? {
        let path = entry.map_err(not_found)?.path();

        if path.is_file() && path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
            paths.push(path);
        }
    }

    paths.sort();

    Ok(paths)
}

pub fn load_image(path: &Path) -> Result<SourceImage, BatchError> {
    let decode_err = |source| BatchError::Decode { path: path.to_path_buf(), source };

    let file = File::open(path).map_err(|e| decode_err(e.into()))?;
    let pixels = codec::decode_rgba(BufReader::new(file)).map_err(decode_err)?;

    debug!("Loaded {} ({}x{})", path.display(), pixels.width, pixels.height);

    Ok(SourceImage { path: path.to_path_buf(), pixels })
}

/// Decodes all files, keeping their order
pub fn load_images(paths: &[PathBuf]) -> Result<Vec<SourceImage>, BatchError> {
    paths.par_iter().map(|p| load_image(p)).collect()
}

/// Accumulates every image into one histogram. Workers fill partial
/// histograms which are merged afterwards
pub fn build_histogram(images: &[SourceImage]) -> Result<Histogram, BatchError> {
    images
        .par_iter()
        .try_fold(Histogram::new, |mut hist, source| {
            hist.add_image(&source.image()?);
            Ok::<_, BatchError>(hist)
        })
        .try_reduce(Histogram::new, |a, b| Ok(a.merge(b)))
}

/// Remaps one image to the shared palette, encodes it and writes it to `dest`
/// under its source file name
pub fn write_image(
    result: &QuantizeResult,
    source: &SourceImage,
    dest: &Path,
) -> Result<PathBuf, BatchError> {
    let image = source.image()?;

    let mut indexes = vec![0u8; image.pixel_count()];
    result
        .remap_image(&image, &mut indexes)
        .map_err(BatchError::Quantize)?;

    let encoded = codec::encode_indexed(image.width, image.height, result.get_palette(), &indexes)
        .map_err(|source_err| BatchError::Encode {
            path: source.path.clone(),
            source: source_err,
        })?;

    let out_path = match source.path.file_name() {
        Some(name) => dest.join(name),
        None => {
            return Err(BatchError::Write {
                path: source.path.clone(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "source has no file name"),
            });
        }
    };

    fs::write(&out_path, &encoded).map_err(|e| BatchError::Write {
        path: out_path.clone(),
        source: e,
    })?;

    debug!("Wrote {} ({} bytes)", out_path.display(), encoded.len());

    Ok(out_path)
}

/// Runs the whole conversion. No PNG files in the source directory is not an
/// error, the report is just empty
pub fn run(config: &BatchConfig) -> Result<BatchReport, BatchError> {
    let paths = scan(&config.source)?;

    if paths.is_empty() {
        warn!(
            "No PNG files to process found in {}",
            config.source.display()
        );
        return Ok(BatchReport::default());
    }

    info!("Found {} PNG files in {}", paths.len(), config.source.display());

    fs::create_dir_all(&config.dest).map_err(|e| BatchError::Write {
        path: config.dest.clone(),
        source: e,
    })?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs.unwrap_or(0))
        .build()?;

    pool.install(|| -> Result<BatchReport, BatchError> {
        let images = load_images(&paths)?;

        let hist = build_histogram(&images)?;
        info!("Histogram holds {} colors", hist.len());

        let result = QuantizeResult::quantize_histogram(&hist, &config.options)
            .map_err(BatchError::Quantize)?;
        drop(hist);

        info!(
            "Palette of {} colors, quantization error {:.3}",
            result.get_palette().len(),
            result.get_error()
        );

        let written = images
            .par_iter()
            .map(|source| write_image(&result, source, &config.dest))
            .collect::<Result<Vec<_>, _>>()?;

        info!("Wrote {} images to {}", written.len(), config.dest.display());

        Ok(BatchReport {
            written,
            palette_len: result.get_palette().len(),
            quantization_error: result.get_error(),
        })
    })
}
