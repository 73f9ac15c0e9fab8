use crate::error::Error;

/// Quantization attributes
#[derive(Debug, Clone)]
pub struct Options {
    max_colors: usize,
    dithering_level: f32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_colors: 256,
            dithering_level: 1.0,
        }
    }
}

impl Options {
    /// Sets the maximum palette size.
    ///
    /// Returns [`Error::ValueOutOfRange`] if `colors` is not in `2..=256`
    pub fn set_max_colors(&mut self, colors: usize) -> Result<(), Error> {
        if !(2..=256).contains(&colors) {
            return Err(Error::ValueOutOfRange);
        }

        self.max_colors = colors;

        Ok(())
    }

    pub fn get_max_colors(&self) -> usize {
        self.max_colors
    }

    /// Sets the dithering level applied by remapping.
    ///
    /// Returns [`Error::ValueOutOfRange`] if the provided value is greater
    /// than 1.0 or lesser than 0.0
    pub fn set_dithering_level(&mut self, level: f32) -> Result<(), Error> {
        if !(0.0..=1.0).contains(&level) {
            return Err(Error::ValueOutOfRange);
        }

        self.dithering_level = level;

        Ok(())
    }

    pub fn get_dithering_level(&self) -> f32 {
        self.dithering_level
    }
}
