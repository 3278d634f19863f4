//! Feature standardization and k-means clustering.

use crate::error::{DataCommitError, Result};

/// Deterministic SplitMix64 generator.
struct SplitMix64(u64);

impl SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Scale every column to zero mean and unit (population) variance.
///
/// Constant columns are only centered.
pub fn standardize(rows: &mut [Vec<f64>]) {
    let Some(dims) = rows.first().map(Vec::len) else {
        return;
    };
    let n = rows.len() as f64;

    for d in 0..dims {
        let mean = rows.iter().map(|r| r[d]).sum::<f64>() / n;
        let var = rows.iter().map(|r| (r[d] - mean).powi(2)).sum::<f64>() / n;
        let std = if var > 0.0 { var.sqrt() } else { 1.0 };
        for row in rows.iter_mut() {
            row[d] = (row[d] - mean) / std;
        }
    }
}

/// Lloyd's k-means with k-means++ seeding and several restarts.
#[derive(Debug, Clone)]
pub struct KMeans {
    pub k: usize,
    pub n_init: usize,
    pub max_iter: usize,
    pub tol: f64,
    pub seed: u64,
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            n_init: 10,
            max_iter: 300,
            tol: 1e-4,
            seed: 42,
        }
    }

    /// Cluster `rows` and return one label per row.
    ///
    /// Labels are numbered in order of first appearance, so the first row is
    /// always cluster 0. The restart with the lowest inertia wins.
    pub fn fit_predict(&self, rows: &[Vec<f64>]) -> Result<Vec<usize>> {
        if self.k == 0 {
            return Err(DataCommitError::Diarization("k must be at least 1".into()));
        }
        if rows.len() < self.k {
            return Err(DataCommitError::Diarization(format!(
                "{} samples cannot form {} clusters",
                rows.len(),
                self.k
            )));
        }

        let tol = self.tol * mean_variance(rows);
        let mut rng = SplitMix64(self.seed);

        let mut best: Option<(f64, Vec<usize>)> = None;
        for _ in 0..self.n_init {
            let mut centers = self.init_centers(rows, &mut rng);
            let (labels, inertia) = self.lloyd(rows, &mut centers, tol);
            if best.as_ref().map_or(true, |(b, _)| inertia < *b) {
                best = Some((inertia, labels));
            }
        }

        let labels = best.map(|(_, l)| l).unwrap_or_default();
        Ok(relabel_by_first_appearance(&labels))
    }

    fn init_centers(&self, rows: &[Vec<f64>], rng: &mut SplitMix64) -> Vec<Vec<f64>> {
        let mut centers = vec![rows[rng.below(rows.len())].clone()];
        let mut closest: Vec<f64> = rows.iter().map(|r| squared_distance(r, &centers[0])).collect();

        while centers.len() < self.k {
            let total: f64 = closest.iter().sum();
            let next = if total > 0.0 {
                let target = rng.next_f64() * total;
                let mut cumulative = 0.0;
                closest
                    .iter()
                    .position(|d| {
                        cumulative += d;
                        cumulative > target
                    })
                    .unwrap_or(rows.len() - 1)
            } else {
                rng.below(rows.len())
            };

            centers.push(rows[next].clone());
            for (c, row) in closest.iter_mut().zip(rows) {
                *c = c.min(squared_distance(row, &rows[next]));
            }
        }
        centers
    }

    fn assign(rows: &[Vec<f64>], centers: &[Vec<f64>]) -> (Vec<usize>, f64) {
        let mut inertia = 0.0;
        let labels = rows
            .iter()
            .map(|row| {
                let (label, dist) = centers
                    .iter()
                    .map(|c| squared_distance(row, c))
                    .enumerate()
                    .fold((0, f64::INFINITY), |acc, (i, d)| if d < acc.1 { (i, d) } else { acc });
                inertia += dist;
                label
            })
            .collect();
        (labels, inertia)
    }

    fn lloyd(&self, rows: &[Vec<f64>], centers: &mut [Vec<f64>], tol: f64) -> (Vec<usize>, f64) {
        let dims = rows[0].len();

        for _ in 0..self.max_iter {
            let (labels, _) = Self::assign(rows, centers);

            let mut sums = vec![vec![0.0; dims]; self.k];
            let mut counts = vec![0usize; self.k];
            for (row, &label) in rows.iter().zip(&labels) {
                counts[label] += 1;
                for (s, v) in sums[label].iter_mut().zip(row) {
                    *s += v;
                }
            }

            let mut shift = 0.0;
            for (i, center) in centers.iter_mut().enumerate() {
                // empty clusters keep their previous center
                if counts[i] == 0 {
                    continue;
                }
                let updated: Vec<f64> = sums[i].iter().map(|s| s / counts[i] as f64).collect();
                shift += squared_distance(center, &updated);
                *center = updated;
            }

            if shift <= tol {
                break;
            }
        }

        Self::assign(rows, centers)
    }
}

fn mean_variance(rows: &[Vec<f64>]) -> f64 {
    let dims = rows[0].len();
    if dims == 0 {
        return 0.0;
    }
    let n = rows.len() as f64;
    let total: f64 = (0..dims)
        .map(|d| {
            let mean = rows.iter().map(|r| r[d]).sum::<f64>() / n;
            rows.iter().map(|r| (r[d] - mean).powi(2)).sum::<f64>() / n
        })
        .sum();
    total / dims as f64
}

fn relabel_by_first_appearance(labels: &[usize]) -> Vec<usize> {
    // index in `seen` is the new label
    let mut seen: Vec<usize> = Vec::new();
    labels
        .iter()
        .map(|&l| {
            if let Some(pos) = seen.iter().position(|&s| s == l) {
                pos
            } else {
                seen.push(l);
                seen.len() - 1
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> Vec<Vec<f64>> {
        let mut rows = Vec::new();
        for i in 0..20 {
            let jitter = (i % 5) as f64 * 0.05;
            if i % 2 == 0 {
                rows.push(vec![10.0 + jitter, 10.0 - jitter]);
            } else {
                rows.push(vec![-10.0 - jitter, -10.0 + jitter]);
            }
        }
        rows
    }

    #[test]
    fn test_separates_well_separated_clusters() {
        let labels = KMeans::new(2).fit_predict(&blobs()).unwrap();

        assert_eq!(labels[0], 0);
        for (i, label) in labels.iter().enumerate() {
            assert_eq!(*label, i % 2);
        }
    }

    #[test]
    fn test_three_clusters() {
        let rows: Vec<Vec<f64>> = [0.0, 50.0, 100.0]
            .iter()
            .flat_map(|c| (0..4).map(move |i| vec![c + i as f64 * 0.1]))
            .collect();
        let labels = KMeans::new(3).fit_predict(&rows).unwrap();

        assert_eq!(labels, vec![0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2]);
    }

    #[test]
    fn test_deterministic() {
        let a = KMeans::new(2).fit_predict(&blobs()).unwrap();
        let b = KMeans::new(2).fit_predict(&blobs()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_too_few_samples() {
        let result = KMeans::new(3).fit_predict(&[vec![1.0], vec![2.0]]);
        assert!(matches!(result, Err(DataCommitError::Diarization(_))));
    }

    #[test]
    fn test_standardize() {
        let mut rows = vec![vec![1.0, 5.0], vec![3.0, 5.0]];
        standardize(&mut rows);

        assert_eq!(rows, vec![vec![-1.0, 0.0], vec![1.0, 0.0]]);
    }

    #[test]
    fn test_relabel() {
        assert_eq!(relabel_by_first_appearance(&[2, 2, 0, 1, 0]), vec![0, 0, 1, 2, 1]);
    }
}
