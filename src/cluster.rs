use std::cmp::{Ord, Ordering};
use std::collections::BinaryHeap;

use crate::histogram::{Histogram, HistogramEntry};
use crate::ord_float::OrdFloat32;

/// A box of histogram colors for median cut
pub(crate) struct Cluster {
    pub entries: Vec<HistogramEntry>,
    pub mean: [f32; 4],
    pub weight: u64,
    pub priority: OrdFloat32,
    widest_chan: usize,
}

impl Ord for Cluster {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority.cmp(&other.priority)
    }
}

impl PartialOrd for Cluster {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for Cluster {}

impl PartialEq for Cluster {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority
    }
}

impl Cluster {
    pub fn new(entries: Vec<HistogramEntry>) -> Self {
        let mut cluster = Self {
            entries,
            mean: [0.0; 4],
            weight: 0,
            priority: 0f32.into(),
            widest_chan: 0,
        };

        cluster.calc_mean_and_weight();
        cluster.calc_widest_and_priority();

        cluster
    }

    pub fn from_histogram(hist: &Histogram) -> Self {
        let mut entries: Vec<HistogramEntry> = hist.entries().copied().collect();
        entries.sort_unstable_by_key(|e| u32::from_le_bytes(e.color));

        Self::new(entries)
    }

    /// Splits clusters until there are `max_clusters` of them or none of them
    /// can be split any further
    pub fn split_into(self, max_clusters: usize) -> Vec<Cluster> {
        let mut heap = BinaryHeap::with_capacity(max_clusters);
        heap.push(self);

        while heap.len() < max_clusters {
            let Some(top) = heap.peek() else { break };
            if !top.can_split() {
                break;
            }

            if let Some(cluster) = heap.pop() {
                let (c1, c2) = cluster.split();
                heap.push(c1);
                heap.push(c2);
            }
        }

        heap.into_vec()
    }

    fn can_split(&self) -> bool {
        self.entries.len() > 1 && self.priority > 0f32.into()
    }

    fn calc_mean_and_weight(&mut self) {
        self.weight = 0;

        if self.entries.is_empty() {
            self.mean = [0.0; 4];
            return
        }

        let mut sums = [0u64; 4];

        for e in self.entries.iter() {
            let weight = e.weight as u64;

            for ch in 0..4 {
                sums[ch] += e.color[ch] as u64 * weight;
            }

            self.weight += weight;
        }

        let weight = self.weight.max(1) as f64;
        self.mean = sums.map(|s| (s as f64 / weight) as f32);
    }

    fn calc_widest_and_priority(&mut self) {
        if self.entries.len() < 2 || self.weight == 0 {
            self.priority = 0f32.into();
            return
        }

        let mut diff_sum = [0f64; 4];

        for e in self.entries.iter() {
            let weight = e.weight as f64;

            for ch in 0..4 {
                diff_sum[ch] += (e.color[ch] as f64 - self.mean[ch] as f64).abs() * weight;
            }
        }

        let mut chan = 0;
        let mut max_diff_sum = 0f64;

        for (ch, &d) in diff_sum.iter().enumerate() {
            if d > max_diff_sum {
                chan = ch;
                max_diff_sum = d;
            }
        }

        let weight = self.weight as f64;
        let chan_diff = max_diff_sum / weight;

        self.priority = ((chan_diff * weight.sqrt()) as f32).into();
        self.widest_chan = chan;
    }

    /// Cuts the cluster at the weighted median of its widest channel.
    /// Both halves are never empty
    fn split(mut self) -> (Cluster, Cluster) {
        let chan = self.widest_chan;

        self.entries.sort_unstable_by_key(|e| (e.color[chan], u32::from_le_bytes(e.color)));

        let half = self.weight / 2;
        let mut acc = 0u64;
        let mut split_pos = self.entries.len() - 1;

        for (i, e) in self.entries.iter().enumerate() {
            acc += e.weight as u64;
            if acc >= half {
                split_pos = i + 1;
                break
            }
        }

        let split_pos = split_pos.clamp(1, self.entries.len() - 1);
        let rest = self.entries.split_off(split_pos);

        (Self::new(self.entries), Self::new(rest))
    }
}
