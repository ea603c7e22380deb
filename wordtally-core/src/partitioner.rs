//! Hash routing between the source task and the counter tasks.
//!
//! All occurrences of a token must reach the same counter task, otherwise
//! its count splits across stores.

use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use ahash::AHasher;

/// Trait for partitioning data across parallel instances.
pub trait Partitioner<T>: Send + Sync {
    /// Determine which partition (0..num_partitions) this value goes to.
    fn partition(&self, value: &T, num_partitions: usize) -> usize;
}

/// Hash-based partitioner using a key selector function.
pub struct HashPartitioner<K, F> {
    key_selector: F,
    _phantom: PhantomData<K>,
}

impl<K, F> HashPartitioner<K, F> {
    pub fn new(key_selector: F) -> Self {
        Self {
            key_selector,
            _phantom: PhantomData,
        }
    }
}

impl<K, T, F> Partitioner<T> for HashPartitioner<K, F>
where
    K: Hash + Send + Sync,
    F: Fn(&T) -> K + Send + Sync,
{
    fn partition(&self, value: &T, num_partitions: usize) -> usize {
        let key = (self.key_selector)(value);
        let mut hasher = AHasher::default();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % num_partitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{StreamRecord, Token};

    fn token_partitioner() -> impl Partitioner<StreamRecord<Token>> {
        HashPartitioner::new(|rec: &StreamRecord<Token>| rec.value.clone())
    }

    #[test]
    fn test_same_token_same_partition() {
        let partitioner = token_partitioner();
        let a = StreamRecord::new("cat".to_string());
        let b = StreamRecord::with_timestamp("cat".to_string(), 99);
        assert_eq!(partitioner.partition(&a, 4), partitioner.partition(&b, 4));
    }

    #[test]
    fn test_partition_within_bounds() {
        let partitioner = token_partitioner();
        for i in 0..100 {
            let rec = StreamRecord::new(format!("word_{i}"));
            assert!(partitioner.partition(&rec, 8) < 8);
        }
    }

    #[test]
    fn test_partition_distribution() {
        let partitioner = token_partitioner();
        let mut counts = vec![0usize; 4];
        for i in 0..1000 {
            let rec = StreamRecord::new(format!("word_{i}"));
            counts[partitioner.partition(&rec, 4)] += 1;
        }
        // Roughly 250 per partition; wide tolerance, just not degenerate.
        for count in counts {
            assert!(count > 150 && count < 350, "unbalanced distribution: {count}");
        }
    }
}
