use crate::cluster::Cluster;
use crate::color::Color;
use crate::histogram::Histogram;
use crate::palette::Palette;
use crate::vpsearch::SearchTree;

struct ColormapEntry {
    color: [f32; 4],
    weight: f32,
}

/// Palette colors in float precision plus a nearest color index over them
pub(crate) struct Colormap {
    entries: Vec<ColormapEntry>,
    tree: SearchTree,
    /// Weighted mean squared distance of the histogram to the colormap
    pub error: f32,
}

impl Colormap {
    /// Every histogram color becomes a palette entry as is
    pub fn from_histogram(hist: &Histogram) -> Self {
        let entries = hist
            .entries()
            .map(|e| ColormapEntry {
                color: Color::from(e.color).as_f32(),
                weight: e.weight as f32,
            })
            .collect();

        let mut colormap = Self::new(entries);
        colormap.error = 0.0;

        colormap
    }

    /// Every cluster becomes a palette entry colored by its weighted mean
    pub fn from_clusters(clusters: &[Cluster], hist: &Histogram) -> Self {
        let entries = clusters
            .iter()
            .map(|c| ColormapEntry {
                // Round now so lookups agree with the 8 bit palette
                color: Color::from_f32(&c.mean).as_f32(),
                weight: c.weight as f32,
            })
            .collect();

        let mut colormap = Self::new(entries);
        colormap.error = colormap.calc_error(hist);

        colormap
    }

    fn new(mut entries: Vec<ColormapEntry>) -> Self {
        // Translucent colors first, so the tRNS chunk stays short
        entries.sort_by_key(|e| {
            let c = Color::from_f32(&e.color);
            (c.a, c.r, c.g, c.b)
        });
        entries.dedup_by_key(|e| Color::from_f32(&e.color));

        let colors: Vec<[f32; 4]> = entries.iter().map(|e| e.color).collect();
        let weights: Vec<f32> = entries.iter().map(|e| e.weight).collect();

        Self {
            tree: SearchTree::new(&colors, &weights),
            entries,
            error: 0.0,
        }
    }

    fn calc_error(&self, hist: &Histogram) -> f32 {
        let mut total = 0f64;
        let mut weight = 0f64;

        for e in hist.entries() {
            let (_, d) = self.nearest_ind(&Color::from(e.color).as_f32());
            total += d as f64 * e.weight as f64;
            weight += e.weight as f64;
        }

        if weight > 0.0 {
            (total / weight) as f32
        } else {
            0.0
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the index of the closest entry and its squared distance
    pub fn nearest_ind(&self, color: &[f32; 4]) -> (usize, f32) {
        self.tree.find_nearest(color)
    }

    pub fn color(&self, ind: usize) -> [f32; 4] {
        self.entries[ind].color
    }

    pub fn generate_palette(&self) -> Palette {
        Palette::from_colors(self.entries.iter().map(|e| Color::from_f32(&e.color)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::HistogramEntry;

    fn histogram(colors: &[([u8; 4], u32)]) -> Histogram {
        let entries: Vec<HistogramEntry> = colors
            .iter()
            .map(|&(color, weight)| HistogramEntry { color, weight })
            .collect();

        let mut hist = Histogram::new();
        hist.add_colors(&entries);
        hist
    }

    #[test]
    fn test_from_histogram_is_lossless() {
        let hist = histogram(&[([255, 0, 0, 255], 1), ([0, 0, 255, 128], 2), ([0, 0, 0, 0], 1)]);
        let colormap = Colormap::from_histogram(&hist);

        assert_eq!(colormap.len(), 3);
        assert_eq!(colormap.error, 0.0);
        assert_eq!(colormap.color(0), [0.0, 0.0, 0.0, 0.0]);
        assert_eq!(colormap.color(1), [0.0, 0.0, 255.0, 128.0]);
        assert_eq!(colormap.color(2), [255.0, 0.0, 0.0, 255.0]);
    }

    #[test]
    fn test_from_clusters_reports_error() {
        let hist = histogram(&[([0, 0, 0, 255], 1), ([2, 0, 0, 255], 1)]);
        let clusters = vec![Cluster::new(hist.entries().copied().collect())];
        let colormap = Colormap::from_clusters(&clusters, &hist);

        assert_eq!(colormap.len(), 1);
        assert_eq!(colormap.color(0), [1.0, 0.0, 0.0, 255.0]);
        assert_eq!(colormap.error, 1.0);
    }
}
