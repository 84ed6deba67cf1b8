//! Seeded random projection families for LSH bucket signatures

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::vector_index::{dot, normalize, DistanceMetric, IndexConfig};

/// One random projection (hyperplane normal plus offset)
#[derive(Debug, Clone)]
struct Projection {
    direction: Vec<f32>,
    offset: f32,
}

/// Per-table projection sets producing bucket keys for a vector
///
/// Cosine uses sign-of-projection bits (SimHash); Euclidean uses p-stable
/// quantized projections `floor((v.r + b) / w)`. Both are derived from the
/// same seed so a given config always yields the same buckets.
#[derive(Debug, Clone)]
pub struct HashFamily {
    metric: DistanceMetric,
    tables: Vec<Vec<Projection>>,
    bucket_width: f32,
    probes: usize,
}

impl HashFamily {
    pub fn new(config: &IndexConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);

        let tables = (0..config.num_tables)
            .map(|_| {
                (0..config.hash_bits)
                    .map(|_| {
                        let mut direction: Vec<f32> =
                            (0..config.dimension).map(|_| gaussian(&mut rng)).collect();
                        normalize(&mut direction);

                        Projection {
                            direction,
                            offset: rng.gen_range(0.0..config.bucket_width),
                        }
                    })
                    .collect()
            })
            .collect();

        Self {
            metric: config.metric,
            tables,
            bucket_width: config.bucket_width,
            probes: config.probes,
        }
    }

    pub fn num_tables(&self) -> usize {
        self.tables.len()
    }

    /// Bucket key of `vector` in `table`
    pub fn signature(&self, table: usize, vector: &[f32]) -> u64 {
        match self.metric {
            DistanceMetric::Cosine => {
                let projections = self.project(table, vector);
                sign_key(&projections)
            }
            DistanceMetric::Euclidean => {
                let (cells, _) = self.quantize(table, vector);
                cell_key(&cells)
            }
        }
    }

    /// Base bucket key followed by up to `probes` neighbouring keys
    ///
    /// Neighbours perturb the components whose projection lies closest to a
    /// bucket boundary, which are the most likely to differ for a near vector.
    pub fn probe_sequence(&self, table: usize, vector: &[f32]) -> Vec<u64> {
        let mut keys = Vec::with_capacity(1 + self.probes);

        match self.metric {
            DistanceMetric::Cosine => {
                let projections = self.project(table, vector);
                let base = sign_key(&projections);
                keys.push(base);

                for bit in closest_components(projections.iter().map(|p| p.abs()), self.probes) {
                    keys.push(base ^ (1u64 << bit));
                }
            }
            DistanceMetric::Euclidean => {
                let (cells, fractions) = self.quantize(table, vector);
                keys.push(cell_key(&cells));

                let margins = fractions.iter().map(|f| f.min(1.0 - f));

                for component in closest_components(margins, self.probes) {
                    let step = if fractions[component] < 0.5 { -1 } else { 1 };

                    // Saturated cells have no neighbour on that side
                    let Some(cell) = cells[component].checked_add(step) else {
                        continue;
                    };

                    let mut shifted = cells.clone();
                    shifted[component] = cell;
                    keys.push(cell_key(&shifted));
                }
            }
        }

        keys
    }

    fn project(&self, table: usize, vector: &[f32]) -> Vec<f32> {
        self.tables[table]
            .iter()
            .map(|p| dot(vector, &p.direction))
            .collect()
    }

    /// Integer cell per projection plus the fractional position inside it
    fn quantize(&self, table: usize, vector: &[f32]) -> (Vec<i64>, Vec<f32>) {
        self.tables[table]
            .iter()
            .map(|p| {
                let scaled = (dot(vector, &p.direction) + p.offset) / self.bucket_width;
                let cell = scaled.floor();
                (cell as i64, scaled - cell)
            })
            .unzip()
    }
}

/// Standard normal sample via Box-Muller
fn gaussian(rng: &mut StdRng) -> f32 {
    let u1: f32 = rng.gen_range(f32::EPSILON..1.0);
    let u2: f32 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos()
}

fn sign_key(projections: &[f32]) -> u64 {
    projections
        .iter()
        .enumerate()
        .fold(0u64, |key, (bit, value)| {
            if *value >= 0.0 {
                key | (1u64 << bit)
            } else {
                key
            }
        })
}

fn cell_key(cells: &[i64]) -> u64 {
    cells.iter().fold(0xcbf2_9ce4_8422_2325u64, |key, cell| {
        (key ^ (*cell as u64)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

/// Indices of the `count` smallest margins, stable on ties
fn closest_components(margins: impl Iterator<Item = f32>, count: usize) -> Vec<usize> {
    let mut ranked: Vec<(usize, f32)> = margins.enumerate().collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    ranked.into_iter().take(count).map(|(i, _)| i).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(metric: DistanceMetric) -> IndexConfig {
        IndexConfig::new(16)
            .with_metric(metric)
            .with_num_tables(3)
            .with_hash_bits(10)
            .with_probes(2)
    }

    fn vector(seed: u64) -> Vec<f32> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..16).map(|_| rng.gen_range(-1.0f32..1.0)).collect()
    }

    #[test]
    fn test_same_seed_same_signatures() {
        let a = HashFamily::new(&config(DistanceMetric::Cosine));
        let b = HashFamily::new(&config(DistanceMetric::Cosine));
        let v = vector(1);

        for table in 0..3 {
            assert_eq!(a.signature(table, &v), b.signature(table, &v));
        }
    }

    #[test]
    fn test_different_seed_changes_signatures() {
        let a = HashFamily::new(&config(DistanceMetric::Cosine));
        let b = HashFamily::new(&config(DistanceMetric::Cosine).with_seed(99));

        let differs = (0..20u64).any(|s| {
            let v = vector(s);
            a.signature(0, &v) != b.signature(0, &v)
        });
        assert!(differs);
    }

    #[test]
    fn test_cosine_signature_is_scale_invariant() {
        let family = HashFamily::new(&config(DistanceMetric::Cosine));
        let v = vector(3);
        let scaled: Vec<f32> = v.iter().map(|x| x * 10.0).collect();

        assert_eq!(family.signature(0, &v), family.signature(0, &scaled));
    }

    #[test]
    fn test_probe_sequence_starts_with_signature() {
        for metric in [DistanceMetric::Cosine, DistanceMetric::Euclidean] {
            let family = HashFamily::new(&config(metric));
            let v = vector(5);
            let probes = family.probe_sequence(1, &v);

            assert_eq!(probes.len(), 3);
            assert_eq!(probes[0], family.signature(1, &v));
            assert_ne!(probes[1], probes[0]);
            assert_ne!(probes[2], probes[0]);
        }
    }

    #[test]
    fn test_cosine_probes_flip_single_bits() {
        let family = HashFamily::new(&config(DistanceMetric::Cosine));
        let probes = family.probe_sequence(0, &vector(8));

        for probe in &probes[1..] {
            assert_eq!((probe ^ probes[0]).count_ones(), 1);
        }
    }

    #[test]
    fn test_closest_components() {
        let margins = vec![0.5, 0.1, 0.9, 0.1];
        assert_eq!(closest_components(margins.into_iter(), 3), vec![1, 3, 0]);
    }
}
