use super::Dataset;
use crate::error::{DatasetError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_BATCH_SIZE: usize = 4;
pub const DEFAULT_NUM_WORKERS: usize = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoaderOptions {
    pub batch_size: usize,
    /// Threads fetching samples within a batch.
    pub num_workers: usize,
    pub shuffle: bool,
    /// Seeds the shuffle. Ignored when `shuffle` is off.
    pub seed: Option<u64>,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            num_workers: DEFAULT_NUM_WORKERS,
            shuffle: false,
            seed: None,
        }
    }
}

/// A run of consecutive samples. `index` counts batches from zero within
/// an epoch.
#[derive(Clone, Debug, PartialEq)]
pub struct Batch<T> {
    pub index: usize,
    pub items: Vec<T>,
}

impl<T> Batch<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Groups dataset samples into batches, fetching each batch on a
/// dedicated worker pool.
pub struct DataLoader<D: Dataset> {
    dataset: Arc<D>,
    options: LoaderOptions,
    pool: rayon::ThreadPool,
}

impl<D: Dataset> DataLoader<D> {
    pub fn new(dataset: Arc<D>, options: LoaderOptions) -> Result<Self> {
        if options.batch_size == 0 {
            return Err(DatasetError::InvalidParameter(
                "batch_size must be positive".to_string(),
            ));
        }
        if options.num_workers == 0 {
            return Err(DatasetError::InvalidParameter(
                "num_workers must be positive".to_string(),
            ));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.num_workers)
            .thread_name(|i| format!("dataset-worker-{}", i))
            .build()?;
        debug!(
            "Loader over {} samples: batch_size={}, num_workers={}, shuffle={}",
            dataset.len(),
            options.batch_size,
            options.num_workers,
            options.shuffle
        );

        Ok(Self {
            dataset,
            options,
            pool,
        })
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    pub fn options(&self) -> LoaderOptions {
        self.options
    }

    /// Number of batches per epoch. The last one may be short.
    pub fn num_batches(&self) -> usize {
        self.dataset.len().div_ceil(self.options.batch_size)
    }

    /// Batches of the first epoch.
    pub fn iter(&self) -> Batches<'_, D> {
        self.epoch(0)
    }

    /// Batches of the given epoch. With a seed, each epoch gets its own
    /// reproducible order.
    pub fn epoch(&self, epoch: u64) -> Batches<'_, D> {
        let mut order: Vec<usize> = (0..self.dataset.len()).collect();
        if self.options.shuffle {
            let mut rng = match self.options.seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(epoch)),
                None => StdRng::from_os_rng(),
            };
            order.shuffle(&mut rng);
        }
        Batches {
            loader: self,
            order,
            next_batch: 0,
        }
    }

    /// Fetches the given indices in parallel, keeping their order.
    pub fn load(&self, indices: &[usize]) -> Result<Vec<D::Item>> {
        let dataset = &self.dataset;
        self.pool
            .install(|| indices.par_iter().map(|&i| dataset.get(i)).collect())
    }
}

/// Iterator over one epoch of batches.
pub struct Batches<'a, D: Dataset> {
    loader: &'a DataLoader<D>,
    order: Vec<usize>,
    next_batch: usize,
}

impl<D: Dataset> Iterator for Batches<'_, D> {
    type Item = Result<Batch<D::Item>>;

    fn next(&mut self) -> Option<Self::Item> {
        let batch_size = self.loader.options.batch_size;
        let start = self.next_batch * batch_size;
        if start >= self.order.len() {
            return None;
        }
        let end = (start + batch_size).min(self.order.len());
        let index = self.next_batch;
        self.next_batch += 1;

        Some(
            self.loader
                .load(&self.order[start..end])
                .map(|items| Batch { index, items }),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .loader
            .num_batches()
            .saturating_sub(self.next_batch);
        (remaining, Some(remaining))
    }
}

impl<D: Dataset> ExactSizeIterator for Batches<'_, D> {}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns its own index, failing past `fail_from`.
    struct Counting {
        len: usize,
        fail_from: usize,
    }

    impl Dataset for Counting {
        type Item = usize;

        fn len(&self) -> usize {
            self.len
        }

        fn get(&self, index: usize) -> Result<usize> {
            if index >= self.fail_from {
                return Err(DatasetError::IndexOutOfRange {
                    index,
                    len: self.fail_from,
                });
            }
            Ok(index)
        }
    }

    fn loader(len: usize, options: LoaderOptions) -> DataLoader<Counting> {
        DataLoader::new(Arc::new(Counting { len, fail_from: len }), options).unwrap()
    }

    fn collect(batches: Batches<'_, Counting>) -> Vec<Vec<usize>> {
        batches.map(|b| b.unwrap().items).collect()
    }

    #[test]
    fn test_sequential_batches_with_short_tail() {
        let loader = loader(10, LoaderOptions::default());
        assert_eq!(loader.num_batches(), 3);
        assert_eq!(
            collect(loader.iter()),
            vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7], vec![8, 9]]
        );
    }

    #[test]
    fn test_order_preserved_with_many_workers() {
        let options = LoaderOptions {
            batch_size: 16,
            num_workers: 4,
            ..Default::default()
        };
        let loader = loader(64, options);
        let flat: Vec<usize> = collect(loader.iter()).into_iter().flatten().collect();
        assert_eq!(flat, (0..64).collect::<Vec<_>>());
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible_per_epoch() {
        let options = LoaderOptions {
            batch_size: 5,
            shuffle: true,
            seed: Some(13),
            ..Default::default()
        };
        let first = loader(30, options);
        let second = loader(30, options);

        let epoch0 = collect(first.epoch(0));
        assert_eq!(epoch0, collect(second.epoch(0)));
        assert_ne!(epoch0, collect(first.epoch(1)));

        let mut seen: Vec<usize> = epoch0.into_iter().flatten().collect();
        seen.sort();
        assert_eq!(seen, (0..30).collect::<Vec<_>>());
    }

    #[test]
    fn test_batch_indices_and_size_hint() {
        let loader = loader(9, LoaderOptions::default());
        let mut batches = loader.iter();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches.next().unwrap().unwrap().index, 0);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches.next().unwrap().unwrap().index, 1);
    }

    #[test]
    fn test_empty_dataset_yields_no_batches() {
        let loader = loader(0, LoaderOptions::default());
        assert_eq!(loader.num_batches(), 0);
        assert!(loader.iter().next().is_none());
    }

    #[test]
    fn test_sample_error_fails_the_batch() {
        let dataset = Counting {
            len: 8,
            fail_from: 6,
        };
        let loader = DataLoader::new(Arc::new(dataset), LoaderOptions::default()).unwrap();
        let results: Vec<_> = loader.iter().collect();
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[test]
    fn test_rejects_zero_sizes() {
        let zero_batch = LoaderOptions {
            batch_size: 0,
            ..Default::default()
        };
        let zero_workers = LoaderOptions {
            num_workers: 0,
            ..Default::default()
        };
        let dataset = || Arc::new(Counting { len: 1, fail_from: 1 });
        assert!(DataLoader::new(dataset(), zero_batch).is_err());
        assert!(DataLoader::new(dataset(), zero_workers).is_err());
    }
}
