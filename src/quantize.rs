use log::debug;

use crate::cluster::Cluster;
use crate::colormap::Colormap;
use crate::error::Error;
use crate::histogram::Histogram;
use crate::image::Image;
use crate::options::Options;
use crate::palette::Palette;

/// Error diffusion weights (right, below-behind, below, below-ahead) out of 16
const FS_RIGHT: f32 = 7.0;
const FS_BELOW_BEHIND: f32 = 3.0;
const FS_BELOW: f32 = 5.0;
const FS_BELOW_AHEAD: f32 = 1.0;

/// Result of quantization
pub struct QuantizeResult {
    palette: Palette,
    error: f32,
    dithering_level: f32,
    colormap: Colormap,
}

impl QuantizeResult {
    /// Quantizes the provided [`Image`]
    pub fn quantize(image: &Image, attr: &Options) -> Result<Self, Error> {
        let mut hist = Histogram::new();
        hist.add_image(image);

        Self::quantize_histogram(&hist, attr)
    }

    /// Quantizes the provided [`Histogram`].
    ///
    /// Returns [`Error::EmptyHistogram`] if no colors were added to it
    pub fn quantize_histogram(hist: &Histogram, attr: &Options) -> Result<Self, Error> {
        if hist.is_empty() {
            return Err(Error::EmptyHistogram);
        }

        let max_colors = attr.get_max_colors();

        let colormap = if hist.len() <= max_colors {
            Colormap::from_histogram(hist)
        } else {
            let root = Cluster::from_histogram(hist);
            let clusters = root.split_into(max_colors);

            Colormap::from_clusters(&clusters, hist)
        };

        debug_assert!(colormap.len() <= max_colors);
        let palette = colormap.generate_palette();

        debug!(
            "Quantized {} colors to {} (error {:.3})",
            hist.len(),
            palette.len(),
            colormap.error
        );

        Ok(Self {
            palette,
            error: colormap.error,
            colormap,
            dithering_level: attr.get_dithering_level(),
        })
    }

    /// Returns quantization error. The lesser the error the better the image
    /// was quantized
    pub fn get_error(&self) -> f32 {
        self.error
    }

    /// Returns the [`Palette`] generated after quantization
    pub fn get_palette(&self) -> &Palette {
        &self.palette
    }

    /// Remaps the provided [`Image`] to a slice of palette indexes.
    ///
    /// Returns [`Error::BufferTooSmall`] if the provided buffer is smaller
    /// than `image.width * image.height`
    pub fn remap_image(&self, image: &Image, buf: &mut [u8]) -> Result<(), Error> {
        if buf.len() < image.pixel_count() {
            return Err(Error::BufferTooSmall)
        }

        if image.pixel_count() == 0 {
            return Ok(())
        }

        // Nothing to diffuse when every color has an exact palette match
        if self.dithering_level > 0.0 && self.error > 0.0 {
            self.remap_image_dither(image, buf);
        } else {
            self.remap_image_no_dither(image, buf);
        }

        Ok(())
    }

    fn remap_image_no_dither(&self, image: &Image, buf: &mut [u8]) {
        for (out, pix) in buf.iter_mut().zip(image.pixels()) {
            let color = match pix[3] {
                0 => [0f32; 4],
                _ => [pix[0] as f32, pix[1] as f32, pix[2] as f32, pix[3] as f32],
            };
            let (ind, _) = self.colormap.nearest_ind(&color);

            *out = ind as u8;
        }
    }

    /// Serpentine Floyd-Steinberg. Errors larger than the quantization error
    /// are damped to keep noise from piling up in flat areas
    fn remap_image_dither(&self, image: &Image, buf: &mut [u8]) {
        let error_size = image.width + 2;
        let mut error_curr = vec![[0f32; 4]; error_size];
        let mut error_next = vec![[0f32; 4]; error_size];

        let dithering_coeff = self.dithering_level / 16.0;
        let err_threshold = self.error;

        for y in 0..image.height {
            let reverse = y % 2 == 1;

            for step in 0..image.width {
                let x = if reverse { image.width - 1 - step } else { step };
                let point = image.width * y + x;
                let data_point = point * 4;

                // Error rows are shifted by one so x - 1 never underflows
                let err_ind = x + 1;
                let (behind, ahead) = if reverse {
                    (err_ind + 1, err_ind - 1)
                } else {
                    (err_ind - 1, err_ind + 1)
                };

                let pix = &image.data[data_point..data_point + 4];

                // Transparent pixels neither take nor spread error
                if pix[3] == 0 {
                    buf[point] = self.colormap.nearest_ind(&[0f32; 4]).0 as u8;
                    continue
                }

                let err_pix = &mut error_curr[err_ind];
                if sq_len(err_pix) > err_threshold {
                    scale(err_pix, 0.8);
                }

                let mut dith_pix = [0f32; 4];
                for ch in 0..4 {
                    dith_pix[ch] = (pix[ch] as f32 + err_pix[ch]).clamp(0.0, 255.0);
                }

                let (ind, _) = self.colormap.nearest_ind(&dith_pix);
                buf[point] = ind as u8;

                let pal_pix = self.colormap.color(ind);
                let mut err = [0f32; 4];
                for ch in 0..4 {
                    err[ch] = dith_pix[ch] - pal_pix[ch];
                }

                if sq_len(&err) > err_threshold {
                    scale(&mut err, 0.75);
                }
                scale(&mut err, dithering_coeff);

                add_scaled(&mut error_curr[ahead], &err, FS_RIGHT);
                add_scaled(&mut error_next[behind], &err, FS_BELOW_BEHIND);
                add_scaled(&mut error_next[err_ind], &err, FS_BELOW);
                add_scaled(&mut error_next[ahead], &err, FS_BELOW_AHEAD);
            }

            std::mem::swap(&mut error_curr, &mut error_next);
            error_next.fill([0f32; 4]);
        }
    }
}

#[inline(always)]
fn sq_len(c: &[f32; 4]) -> f32 {
    c[0] * c[0] + c[1] * c[1] + c[2] * c[2] + c[3] * c[3]
}

#[inline(always)]
fn scale(c: &mut [f32; 4], k: f32) {
    for v in c.iter_mut() {
        *v *= k;
    }
}

#[inline(always)]
fn add_scaled(dst: &mut [f32; 4], err: &[f32; 4], k: f32) {
    for ch in 0..4 {
        dst[ch] += err[ch] * k;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: usize, height: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(width * height * 4);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[
                    (x * 255 / width) as u8,
                    (y * 255 / height) as u8,
                    128,
                    255,
                ]);
            }
        }
        data
    }

    #[test]
    fn test_empty_histogram_fails() {
        let res = QuantizeResult::quantize_histogram(&Histogram::new(), &Options::default());
        assert_eq!(res.err(), Some(Error::EmptyHistogram));
    }

    #[test]
    fn test_few_colors_are_kept_exactly() {
        let data = [
            255, 0, 0, 255, 0, 255, 0, 255,
            0, 0, 255, 255, 255, 0, 0, 255,
        ];
        let image = Image::new(&data, 2, 2).unwrap();
        let result = QuantizeResult::quantize(&image, &Options::default()).unwrap();

        assert_eq!(result.get_palette().len(), 3);
        assert_eq!(result.get_error(), 0.0);

        let mut buf = vec![0u8; 4];
        result.remap_image(&image, &mut buf).unwrap();

        let palette = result.get_palette().entries();
        for (&ind, pix) in buf.iter().zip(data.chunks_exact(4)) {
            assert_eq!(&palette[ind as usize].as_array()[..], pix);
        }
    }

    #[test]
    fn test_palette_is_bounded() {
        let data = gradient(64, 64);
        let image = Image::new(&data, 64, 64).unwrap();

        let mut opts = Options::default();
        opts.set_max_colors(16).unwrap();

        let result = QuantizeResult::quantize(&image, &opts).unwrap();
        assert!(result.get_palette().len() <= 16);
        assert!(result.get_error() > 0.0);
    }

    #[test]
    fn test_remap_indexes_are_valid() {
        let data = gradient(40, 30);
        let image = Image::new(&data, 40, 30).unwrap();

        for level in [1.0, 0.0] {
            let mut opts = Options::default();
            opts.set_max_colors(8).unwrap();
            opts.set_dithering_level(level).unwrap();

            let result = QuantizeResult::quantize(&image, &opts).unwrap();
            let count = result.get_palette().len();

            let mut buf = vec![0u8; 40 * 30];
            result.remap_image(&image, &mut buf).unwrap();
            assert!(buf.iter().all(|&i| (i as usize) < count));
        }
    }

    #[test]
    fn test_remap_buffer_too_small() {
        let data = gradient(4, 4);
        let image = Image::new(&data, 4, 4).unwrap();
        let result = QuantizeResult::quantize(&image, &Options::default()).unwrap();

        let mut buf = vec![0u8; 15];
        assert_eq!(result.remap_image(&image, &mut buf), Err(Error::BufferTooSmall));
    }
}
