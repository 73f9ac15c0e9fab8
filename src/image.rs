use crate::error::Error;

/// Image reference containing pixel data and dimensions info
pub struct Image<'data> {
    pub width: usize,
    pub height: usize,
    pub data: &'data [u8],
}

impl<'data> Image<'data> {
    /// Creates an [`Image`] from a slice of RGBA pixels.
    ///
    /// Returns [`Error::BufferTooSmall`] if the provided slice length is less
    /// than `width * height * 4`
    pub fn new(data: &'data [u8], width: usize, height: usize) -> Result<Self, Error> {
        let needed = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or(Error::ValueOutOfRange)?;

        if data.len() < needed {
            return Err(Error::BufferTooSmall);
        }

        Ok(Self { data, width, height })
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Iterates over RGBA pixels in row order
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.data[..self.pixel_count() * 4]
            .chunks_exact(4)
            .map(|p| [p[0], p[1], p[2], p[3]])
    }
}
