//! PNG reading and palette PNG writing on top of the `png` crate

use std::io::{self, Read};

use crate::error::Error;
use crate::image::Image;
use crate::palette::{Palette, MAX_PALETTE_SIZE};

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Png(#[from] png::DecodingError),
    #[error("Unsupported output color type {0:?}")]
    UnsupportedColor(png::ColorType),
}

#[derive(thiserror::Error, Debug)]
pub enum EncodeError {
    #[error("Palette is empty")]
    EmptyPalette,
    #[error("Palette holds {0} colors, at most 256 fit an 8-bit image")]
    PaletteTooLarge(usize),
    #[error("Invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("Index buffer holds {actual} entries, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("Palette index {index} is out of range for a palette of {len} colors")]
    IndexOutOfRange { index: u8, len: usize },
    #[error(transparent)]
    Png(#[from] png::EncodingError),
}

/// Decoded image with owned RGBA pixels
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl DecodedImage {
    pub fn as_image(&self) -> Result<Image<'_>, Error> {
        Image::new(&self.data, self.width, self.height)
    }
}

/// Decodes a PNG of any color type and bit depth to 8-bit RGBA
pub fn decode_rgba<R: Read>(r: R) -> Result<DecodedImage, DecodeError> {
    let mut decoder = png::Decoder::new(r);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);

    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;

    let width = info.width as usize;
    let height = info.height as usize;

    let samples = match info.color_type {
        png::ColorType::Grayscale => 1,
        png::ColorType::GrayscaleAlpha => 2,
        png::ColorType::Rgb => 3,
        png::ColorType::Rgba => 4,
        other => return Err(DecodeError::UnsupportedColor(other)),
    };

    let mut data = Vec::with_capacity(width * height * 4);

    for row in buf[..info.buffer_size()].chunks(info.line_size).take(height) {
        for pix in row[..width * samples].chunks_exact(samples) {
            let rgba = match samples {
                1 => [pix[0], pix[0], pix[0], 255],
                2 => [pix[0], pix[0], pix[0], pix[1]],
                3 => [pix[0], pix[1], pix[2], 255],
                _ => [pix[0], pix[1], pix[2], pix[3]],
            };
            data.extend_from_slice(&rgba);
        }
    }

    Ok(DecodedImage { width, height, data })
}

/// Serializes palette indexes as an 8-bit indexed (color type 3) PNG.
///
/// Every index must address an entry of `palette`
pub fn encode_indexed(
    width: usize,
    height: usize,
    palette: &Palette,
    indexes: &[u8],
) -> Result<Vec<u8>, EncodeError> {
    if palette.is_empty() {
        return Err(EncodeError::EmptyPalette);
    }
    if palette.len() > MAX_PALETTE_SIZE {
        return Err(EncodeError::PaletteTooLarge(palette.len()));
    }

    let invalid = || EncodeError::InvalidDimensions { width, height };
    let png_width = u32::try_from(width).map_err(|_| invalid())?;
    let png_height = u32::try_from(height).map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }

    let expected = width * height;
    if indexes.len() != expected {
        return Err(EncodeError::LengthMismatch { expected, actual: indexes.len() });
    }

    if let Some(&index) = indexes.iter().find(|&&i| i as usize >= palette.len()) {
        return Err(EncodeError::IndexOutOfRange { index, len: palette.len() });
    }

    let mut out = Vec::new();

    let mut encoder = png::Encoder::new(&mut out, png_width, png_height);
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_palette(palette.rgb_bytes());

    let trns = palette.trns_bytes();
    if !trns.is_empty() {
        encoder.set_trns(trns);
    }

    let mut writer = encoder.write_header()?;
    writer.write_image_data(indexes)?;
    writer.finish()?;

    Ok(out)
}
