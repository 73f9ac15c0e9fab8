use std::collections::HashMap;

use crate::image::Image;

macro_rules! hist_key {
    ($c: expr) => {
        u32::from_le_bytes($c)
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistogramEntry {
    pub color: [u8; 4],
    pub weight: u32,
}

/// Color frequency statistics accumulated over one or more images
#[derive(Debug, Default)]
pub struct Histogram {
    pub(crate) map: HashMap<u32, HistogramEntry>,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every pixel of the image with weight 1.
    ///
    /// Fully transparent pixels share a single entry whatever their RGB is
    pub fn add_image(&mut self, image: &Image) {
        for pix in image.pixels() {
            let color = if pix[3] == 0 { [0; 4] } else { pix };
            self.add(color, 1);
        }
    }

    /// Adds pre-weighted colors
    pub fn add_colors(&mut self, entries: &[HistogramEntry]) {
        for e in entries {
            self.add(e.color, e.weight);
        }
    }

    /// Combines two partial histograms into one
    pub fn merge(mut self, other: Histogram) -> Histogram {
        if self.map.len() < other.map.len() {
            return other.merge(self);
        }

        for e in other.map.into_values() {
            self.add(e.color, e.weight);
        }

        self
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistogramEntry> {
        self.map.values()
    }

    fn add(&mut self, color: [u8; 4], weight: u32) {
        self.map
            .entry(hist_key!(color))
            .and_modify(|e| e.weight = e.weight.saturating_add(weight))
            .or_insert(HistogramEntry { color, weight });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weight_of(hist: &Histogram, color: [u8; 4]) -> u32 {
        hist.entries()
            .find(|e| e.color == color)
            .map_or(0, |e| e.weight)
    }

    #[test]
    fn test_add_image_counts_pixels() {
        let data = [
            255, 0, 0, 255, 255, 0, 0, 255,
            0, 255, 0, 255, 10, 20, 30, 0,
        ];
        let image = Image::new(&data, 2, 2).unwrap();

        let mut hist = Histogram::new();
        hist.add_image(&image);

        assert_eq!(hist.len(), 3);
        assert_eq!(weight_of(&hist, [255, 0, 0, 255]), 2);
        assert_eq!(weight_of(&hist, [0, 255, 0, 255]), 1);
        assert_eq!(weight_of(&hist, [0, 0, 0, 0]), 1);
    }

    #[test]
    fn test_transparent_pixels_collapse() {
        let data = [1, 2, 3, 0, 200, 100, 50, 0];
        let image = Image::new(&data, 2, 1).unwrap();

        let mut hist = Histogram::new();
        hist.add_image(&image);

        assert_eq!(hist.len(), 1);
        assert_eq!(weight_of(&hist, [0, 0, 0, 0]), 2);
    }

    #[test]
    fn test_merge_sums_weights() {
        let mut a = Histogram::new();
        a.add_colors(&[
            HistogramEntry { color: [1, 1, 1, 255], weight: 3 },
            HistogramEntry { color: [2, 2, 2, 255], weight: 1 },
        ]);

        let mut b = Histogram::new();
        b.add_colors(&[HistogramEntry { color: [1, 1, 1, 255], weight: 4 }]);

        let merged = b.merge(a);
        assert_eq!(merged.len(), 2);
        assert_eq!(weight_of(&merged, [1, 1, 1, 255]), 7);
        assert_eq!(weight_of(&merged, [2, 2, 2, 255]), 1);
    }

    #[test]
    fn test_new_is_empty() {
        assert!(Histogram::new().is_empty());
    }
}
