mod cluster;
mod color;
mod colormap;
mod error;
mod histogram;
mod image;
mod options;
mod ord_float;
mod palette;
mod quantize;
mod vpsearch;

pub mod batch;
pub mod codec;

pub use crate::color::Color;
pub use crate::error::Error;
pub use crate::histogram::{Histogram, HistogramEntry};
pub use crate::image::Image;
pub use crate::options::Options;
pub use crate::palette::{Palette, MAX_PALETTE_SIZE};
pub use crate::quantize::QuantizeResult;
