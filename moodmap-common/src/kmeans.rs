//! K-means clustering over dense feature rows
//!
//! Lloyd iterations with k-means++ seeding. Several independent
//! initialisations are drawn from one seeded RNG and the fit with the lowest
//! inertia (sum of squared distances to the assigned centroid) is kept, so
//! the same input and seed always produce the same labels.
//!
//! Label identity is arbitrary: label 2 in one fit says nothing about label 2
//! in another fit over different data.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_N_INIT: usize = 10;
pub const DEFAULT_MAX_ITERATIONS: usize = 300;
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// K-means parameters
#[derive(Debug, Clone)]
pub struct KMeans {
    pub k: usize,
    /// Independent initialisations; the best one wins
    pub n_init: usize,
    pub max_iterations: usize,
    /// Stop once the summed squared centroid movement drops to this
    pub tolerance: f64,
    pub seed: u64,
}

/// Result of a fit
#[derive(Debug, Clone)]
pub struct KMeansFit {
    pub centroids: Vec<Vec<f64>>,
    /// One label per input row, each in `0..centroids.len()`
    pub labels: Vec<usize>,
    pub inertia: f64,
    /// Lloyd iterations used by the winning initialisation
    pub iterations: usize,
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            n_init: DEFAULT_N_INIT,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            seed: DEFAULT_SEED,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init.max(1);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Partition `data` into at most `k` groups.
    ///
    /// Returns `None` for empty input or `k == 0`. When there are fewer rows
    /// than `k`, `k` is reduced to the row count. All rows must share one
    /// dimension.
    pub fn fit(&self, data: &[Vec<f64>]) -> Option<KMeansFit> {
        if data.is_empty() || self.k == 0 {
            return None;
        }

        let k = self.k.min(data.len());
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best: Option<KMeansFit> = None;

        for _ in 0..self.n_init.max(1) {
            let candidate = self.fit_once(data, k, &mut rng);
            let better = best
                .as_ref()
                .map_or(true, |b| candidate.inertia < b.inertia);
            if better {
                best = Some(candidate);
            }
        }

        best
    }

    fn fit_once(&self, data: &[Vec<f64>], k: usize, rng: &mut StdRng) -> KMeansFit {
        let mut centroids = init_plus_plus(data, k, rng);
        let mut labels = assign(data, &centroids);
        let mut iterations = 0;

        for iteration in 0..self.max_iterations {
            let updated = update_centroids(data, &labels, &centroids);
            let shift: f64 = centroids
                .iter()
                .zip(updated.iter())
                .map(|(old, new)| distance_sq(old, new))
                .sum();
            centroids = updated;

            let new_labels = assign(data, &centroids);
            let stable = new_labels == labels;
            labels = new_labels;
            iterations = iteration + 1;

            if stable || shift <= self.tolerance {
                break;
            }
        }

        let inertia = data
            .iter()
            .zip(labels.iter())
            .map(|(point, &label)| distance_sq(point, &centroids[label]))
            .sum();

        KMeansFit {
            centroids,
            labels,
            inertia,
            iterations,
        }
    }
}

/// k-means++ seeding: first centroid uniform, the rest sampled with
/// probability proportional to squared distance from the nearest chosen one.
fn init_plus_plus(data: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(data[rng.gen_range(0..data.len())].clone());

    let mut nearest: Vec<f64> = data
        .iter()
        .map(|p| distance_sq(p, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = nearest.iter().sum();
        let next = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            let mut chosen = data.len() - 1;
            for (i, d) in nearest.iter().enumerate() {
                if target < *d {
                    chosen = i;
                    break;
                }
                target -= d;
            }
            chosen
        } else {
            // All remaining points coincide with a centroid
            rng.gen_range(0..data.len())
        };

        let centroid = data[next].clone();
        for (i, p) in data.iter().enumerate() {
            let d = distance_sq(p, &centroid);
            if d < nearest[i] {
                nearest[i] = d;
            }
        }
        centroids.push(centroid);
    }

    centroids
}

/// Index of the nearest centroid for each row (first wins on ties)
fn assign(data: &[Vec<f64>], centroids: &[Vec<f64>]) -> Vec<usize> {
    data.iter()
        .map(|point| {
            let mut best_cluster = 0;
            let mut min_dist_sq = f64::MAX;
            for (j, centroid) in centroids.iter().enumerate() {
                let d = distance_sq(point, centroid);
                if d < min_dist_sq {
                    min_dist_sq = d;
                    best_cluster = j;
                }
            }
            best_cluster
        })
        .collect()
}

/// Mean of the assigned rows per cluster. An empty cluster takes over the
/// row farthest from its current centroid.
fn update_centroids(data: &[Vec<f64>], labels: &[usize], centroids: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let k = centroids.len();
    let dim = data[0].len();
    let mut sums = vec![vec![0.0; dim]; k];
    let mut counts = vec![0usize; k];

    for (point, &label) in data.iter().zip(labels.iter()) {
        for (s, v) in sums[label].iter_mut().zip(point.iter()) {
            *s += v;
        }
        counts[label] += 1;
    }

    let mut taken = vec![false; data.len()];
    let mut updated = Vec::with_capacity(k);

    for j in 0..k {
        if counts[j] > 0 {
            updated.push(sums[j].iter().map(|s| s / counts[j] as f64).collect());
            continue;
        }

        let farthest = data
            .iter()
            .zip(labels.iter())
            .enumerate()
            .filter(|(i, _)| !taken[*i])
            .map(|(i, (p, &label))| (i, distance_sq(p, &centroids[label])))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i);

        match farthest {
            Some(i) => {
                taken[i] = true;
                updated.push(data[i].clone());
            }
            None => updated.push(centroids[j].clone()),
        }
    }

    updated
}

pub fn distance_sq(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}
