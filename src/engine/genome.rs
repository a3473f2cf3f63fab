//! Random source and default gene operators.
//!
//! Provides gene sampling for fresh candidates and single-position mutation.

use rand::prelude::*;

/// Random number generator wrapper owned by one engine invocation.
///
/// Implements [`RngCore`], so custom operators can use the full [`Rng`] API
/// on it.
pub struct GeneRng {
    rng: StdRng,
}

impl GeneRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create with random seed.
    pub fn random() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded when a seed is given, fresh entropy otherwise.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::new(seed),
            None => Self::random(),
        }
    }

    /// Build a gene sequence of `length` by sampling `gene_set` without
    /// replacement, starting a new sample each time the set is exhausted.
    pub fn sample_genes<G: Clone>(&mut self, gene_set: &[G], length: usize) -> Vec<G> {
        let mut genes = Vec::with_capacity(length);
        if gene_set.is_empty() {
            return genes;
        }
        while genes.len() < length {
            let sample_size = (length - genes.len()).min(gene_set.len());
            genes.extend(gene_set.choose_multiple(&mut self.rng, sample_size).cloned());
        }
        genes
    }

    /// Replace one random position with a different gene from `gene_set`.
    ///
    /// Two distinct genes are drawn; the first is used unless it equals the
    /// current value.
    pub fn mutate_gene<G: Clone + PartialEq>(&mut self, genes: &mut [G], gene_set: &[G]) {
        if genes.is_empty() || gene_set.len() < 2 {
            return;
        }
        let index = self.rng.gen_range(0..genes.len());
        let mut picks = gene_set.choose_multiple(&mut self.rng, 2);
        let (Some(new_gene), Some(alternate)) = (picks.next(), picks.next()) else {
            return;
        };
        genes[index] = if *new_gene == genes[index] {
            alternate.clone()
        } else {
            new_gene.clone()
        };
    }

    /// Uniform index in `0..len`.
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Fair coin.
    pub fn coin_flip(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }
}

impl RngCore for GeneRng {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_genes_length() {
        let mut rng = GeneRng::new(42);
        let gene_set = ['a', 'b', 'c'];

        let genes = rng.sample_genes(&gene_set, 10);
        assert_eq!(genes.len(), 10);
        assert!(genes.iter().all(|g| gene_set.contains(g)));
    }

    #[test]
    fn test_sample_without_replacement_per_round() {
        let mut rng = GeneRng::new(7);
        let gene_set: Vec<u32> = (0..8).collect();

        let mut genes = rng.sample_genes(&gene_set, 8);
        genes.sort_unstable();
        assert_eq!(genes, gene_set);
    }

    #[test]
    fn test_mutate_changes_exactly_one_position() {
        let mut rng = GeneRng::new(42);
        let gene_set = [0u8, 1];

        for _ in 0..50 {
            let original = vec![0u8; 16];
            let mut genes = original.clone();
            rng.mutate_gene(&mut genes, &gene_set);
            let changed = original.iter().zip(&genes).filter(|(a, b)| a != b).count();
            assert_eq!(changed, 1);
        }
    }

    #[test]
    fn test_mutate_empty_is_noop() {
        let mut rng = GeneRng::new(1);
        let mut genes: Vec<u8> = Vec::new();
        rng.mutate_gene(&mut genes, &[0, 1]);
        assert!(genes.is_empty());
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let mut a = GeneRng::new(99);
        let mut b = GeneRng::new(99);
        assert_eq!(a.next_u64(), b.next_u64());
        assert_eq!(a.sample_genes(&[1, 2, 3, 4], 12), b.sample_genes(&[1, 2, 3, 4], 12));
    }
}
