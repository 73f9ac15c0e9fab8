use crate::ord_float::OrdFloat32;

#[derive(Clone, Copy)]
struct SearchIdx {
    ind: usize,
    distance_sq: f32,
    weight: f32,
}

struct SearchVisitor {
    ind: usize,
    distance: f32,
    distance_sq: f32,
}

impl SearchVisitor {
    fn new() -> Self {
        Self {
            ind: 0,
            distance: f32::MAX,
            distance_sq: f32::MAX,
        }
    }

    fn visit(&mut self, ind: usize, distance_sq: f32) {
        if self.distance_sq > distance_sq {
            self.ind = ind;
            self.distance = distance_sq.sqrt();
            self.distance_sq = distance_sq;
        }
    }
}

/// Vantage point node. Small leaves keep their points in `rest` and are
/// scanned linearly
struct SearchNode {
    ind: usize,
    near: Option<Box<Self>>,
    far: Option<Box<Self>>,
    rest: Box<[SearchIdx]>,
    radius: f32,
    radius_sq: f32,
}

const LEAF_SIZE: usize = 7;

impl SearchNode {
    fn build(indexes: &mut [SearchIdx], data: &[[f32; 4]]) -> Option<Box<Self>> {
        // The heaviest color is the most likely answer, make it the vantage point
        let vp_pos = indexes
            .iter()
            .enumerate()
            .max_by_key(|&(_, i)| OrdFloat32::from(i.weight))
            .map(|(pos, _)| pos)?;

        indexes.swap(0, vp_pos);

        let vp_ind = indexes[0].ind;
        let vp_data = &data[vp_ind];
        let indexes = &mut indexes[1..];

        for i in indexes.iter_mut() {
            i.distance_sq = dist(vp_data, &data[i.ind]);
        }

        indexes.sort_unstable_by_key(|i| OrdFloat32::from(i.distance_sq));

        let node = if indexes.len() < LEAF_SIZE {
            Self {
                ind: vp_ind,
                near: None,
                far: None,
                rest: indexes.to_vec().into_boxed_slice(),
                radius: f32::MAX,
                radius_sq: f32::MAX,
            }
        } else {
            let (near, far) = indexes.split_at_mut(indexes.len() / 2);
            let radius_sq = far[0].distance_sq;

            Self {
                ind: vp_ind,
                near: Self::build(near, data),
                far: Self::build(far, data),
                rest: Box::default(),
                radius: radius_sq.sqrt(),
                radius_sq,
            }
        };

        Some(Box::new(node))
    }

    fn visit(&self, pin: &[f32; 4], data: &[[f32; 4]], nearest: &mut SearchVisitor) {
        let distance_sq = dist(&data[self.ind], pin);
        nearest.visit(self.ind, distance_sq);

        if self.near.is_none() && self.far.is_none() {
            for r in self.rest.iter() {
                nearest.visit(r.ind, dist(&data[r.ind], pin));
            }
            return;
        }

        let distance = distance_sq.sqrt();

        if distance_sq < self.radius_sq {
            if let Some(near) = &self.near {
                near.visit(pin, data, nearest);
            }
            if distance >= self.radius - nearest.distance {
                if let Some(far) = &self.far {
                    far.visit(pin, data, nearest);
                }
            }
        } else {
            if let Some(far) = &self.far {
                far.visit(pin, data, nearest);
            }
            if distance <= self.radius + nearest.distance {
                if let Some(near) = &self.near {
                    near.visit(pin, data, nearest);
                }
            }
        }
    }
}

/// Nearest-neighbour index over a fixed set of colors
pub(crate) struct SearchTree {
    root: Option<Box<SearchNode>>,
    data: Vec<[f32; 4]>,
}

impl SearchTree {
    /// `weights` rank points as vantage point candidates; missing weights count as zero
    pub(crate) fn new(data: &[[f32; 4]], weights: &[f32]) -> Self {
        let mut indexes: Vec<SearchIdx> = (0..data.len())
            .map(|ind| SearchIdx {
                ind,
                distance_sq: 0.0,
                weight: weights.get(ind).copied().unwrap_or(0.0),
            })
            .collect();

        let root = SearchNode::build(&mut indexes, data);

        Self { root, data: data.to_vec() }
    }

    /// Returns the index of the closest point and its squared distance
    pub(crate) fn find_nearest(&self, pin: &[f32; 4]) -> (usize, f32) {
        match &self.root {
            Some(vantage_point) => {
                let mut nearest = SearchVisitor::new();
                vantage_point.visit(pin, &self.data, &mut nearest);
                (nearest.ind, nearest.distance_sq)
            }
            None => (0, f32::MAX),
        }
    }
}

#[inline(always)]
fn dist(c1: &[f32; 4], c2: &[f32; 4]) -> f32 {
    (c1[0] - c2[0]).powi(2) +
    (c1[1] - c2[1]).powi(2) +
    (c1[2] - c2[2]).powi(2) +
    (c1[3] - c2[3]).powi(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force(data: &[[f32; 4]], pin: &[f32; 4]) -> f32 {
        data.iter().map(|d| dist(d, pin)).fold(f32::MAX, f32::min)
    }

    #[test]
    fn test_matches_linear_scan() {
        let data: Vec<[f32; 4]> = (0..100u32)
            .map(|i| {
                let v = (i * 37 % 256) as f32;
                [v, (i * 11 % 256) as f32, 255.0 - v, (i * 53 % 256) as f32]
            })
            .collect();
        let weights: Vec<f32> = (0..100).map(|i| (i % 7) as f32).collect();

        let tree = SearchTree::new(&data, &weights);

        for p in 0..64u32 {
            let pin = [
                (p * 29 % 256) as f32,
                (p * 71 % 256) as f32,
                (p * 5 % 256) as f32,
                (p * 97 % 256) as f32,
            ];
            let (ind, d) = tree.find_nearest(&pin);
            assert_eq!(d, brute_force(&data, &pin));
            assert_eq!(dist(&data[ind], &pin), d);
        }
    }

    #[test]
    fn test_exact_hit() {
        let data = [[0.0, 0.0, 0.0, 255.0], [255.0, 255.0, 255.0, 255.0]];
        let tree = SearchTree::new(&data, &[]);

        assert_eq!(tree.find_nearest(&[250.0, 250.0, 250.0, 255.0]).0, 1);
        assert_eq!(tree.find_nearest(&[0.0, 0.0, 0.0, 255.0]), (0, 0.0));
    }

    #[test]
    fn test_empty_tree() {
        let tree = SearchTree::new(&[], &[]);
        assert_eq!(tree.find_nearest(&[1.0; 4]), (0, f32::MAX));
    }
}
