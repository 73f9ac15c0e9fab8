use crate::color::Color;

/// Largest palette an 8-bit indexed image can address
pub const MAX_PALETTE_SIZE: usize = 256;

/// Color palette
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<Color>,
}

impl Palette {
    /// Builds a palette from at most [`MAX_PALETTE_SIZE`] colors, extra colors
    /// are dropped
    pub fn from_colors(colors: impl IntoIterator<Item = Color>) -> Self {
        Self {
            entries: colors.into_iter().take(MAX_PALETTE_SIZE).collect(),
        }
    }

    /// The number of colors in the palette
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The palette colors
    pub fn entries(&self) -> &[Color] {
        &self.entries
    }

    /// RGB triples for a PNG `PLTE` chunk
    pub fn rgb_bytes(&self) -> Vec<u8> {
        self.entries.iter().flat_map(|c| [c.r, c.g, c.b]).collect()
    }

    /// Alpha values for a PNG `tRNS` chunk, trailing opaque entries omitted.
    ///
    /// Empty when the whole palette is opaque
    pub fn trns_bytes(&self) -> Vec<u8> {
        let used = self
            .entries
            .iter()
            .rposition(|c| c.a != 255)
            .map_or(0, |last| last + 1);

        self.entries[..used].iter().map(|c| c.a).collect()
    }
}
