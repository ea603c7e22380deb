//! The keyed counter: get-or-zero, increment by one, emit the new
//! cumulative count.
//!
//! Counts never decrement and never reset while the store is alive. A
//! plain increment is not idempotent: redelivered records overcount, so
//! the pipeline assumes exactly-once delivery from its source.

use anyhow::{anyhow, Result};

use crate::config::AggregationMode;
use crate::operator::Operator;
use crate::state::{KeyedStateBackend, ValueStateHandle};
use crate::types::{StreamRecord, Token, WordCount};
use crate::window::TumblingWindows;

/// Counter operator for one partition.
///
/// Owns its state backend exclusively; the pipeline routes all
/// occurrences of a token to one instance, so updates to a counter are
/// serialized without locks. In global mode the state key is the token;
/// in tumbling mode it is the (token, window) pair.
pub struct CountOperator<B: KeyedStateBackend> {
    backend: B,
    windows: Option<TumblingWindows>,
    count_state: ValueStateHandle<u64>,
}

impl<B: KeyedStateBackend> CountOperator<B> {
    pub fn new(mode: &AggregationMode, backend: B) -> Self {
        let windows = match mode {
            AggregationMode::Global => None,
            AggregationMode::TumblingWindow(size) => Some(TumblingWindows::of(*size)),
        };
        Self {
            backend,
            windows,
            count_state: ValueStateHandle::new("count"),
        }
    }

    /// Apply one increment and return the resulting update.
    pub fn process(&mut self, record: &StreamRecord<Token>) -> Result<WordCount> {
        let window = match &self.windows {
            None => None,
            Some(windows) => {
                let ts = record.timestamp.ok_or_else(|| {
                    anyhow!(
                        "windowed aggregation requires record timestamps (token {:?})",
                        record.value
                    )
                })?;
                Some(windows.assign(ts))
            }
        };

        let state_key = match &window {
            None => bincode::serialize(&record.value)?,
            Some(window) => bincode::serialize(&(&record.value, window))?,
        };
        self.backend.set_current_key(state_key);

        let count = self.count_state.get(&self.backend)?.unwrap_or(0) + 1;
        self.count_state.put(&mut self.backend, count)?;

        Ok(match window {
            None => WordCount::global(record.value.clone(), count),
            Some(window) => {
                WordCount::windowed(record.value.clone(), count, window.start, window.end)
            }
        })
    }
}

impl<B: KeyedStateBackend> Operator<StreamRecord<Token>> for CountOperator<B> {
    type OUT = WordCount;

    fn process_batch(
        &mut self,
        input: &[StreamRecord<Token>],
        output: &mut Vec<WordCount>,
    ) -> Result<()> {
        output.reserve(input.len());
        for record in input {
            output.push(self.process(record)?);
        }
        Ok(())
    }

    fn snapshot_state(&self) -> Result<Vec<u8>> {
        self.backend.snapshot()
    }

    fn restore_state(&mut self, data: &[u8]) -> Result<()> {
        self.backend.restore(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::InMemoryStateBackend;
    use std::time::Duration;

    fn global_counter() -> CountOperator<InMemoryStateBackend> {
        CountOperator::new(&AggregationMode::Global, InMemoryStateBackend::new())
    }

    fn record(token: &str) -> StreamRecord<Token> {
        StreamRecord::new(token.to_string())
    }

    #[test]
    fn test_counts_start_at_one_and_increment() {
        let mut counter = global_counter();
        for expected in 1..=5u64 {
            let update = counter.process(&record("the")).unwrap();
            assert_eq!(update.word, "the");
            assert_eq!(update.count, expected);
            assert_eq!(update.window_start, None);
            assert_eq!(update.window_end, None);
        }
    }

    #[test]
    fn test_key_isolation() {
        let mut counter = global_counter();
        counter.process(&record("cat")).unwrap();
        counter.process(&record("cat")).unwrap();

        let dog = counter.process(&record("dog")).unwrap();
        assert_eq!(dog.count, 1);

        let cat = counter.process(&record("cat")).unwrap();
        assert_eq!(cat.count, 3);
    }

    #[test]
    fn test_windowed_counters_scoped_per_window() {
        let mode = AggregationMode::TumblingWindow(Duration::from_secs(30));
        let mut counter = CountOperator::new(&mode, InMemoryStateBackend::new());

        // Two timestamps in the same bucket, one in the next.
        let first = counter
            .process(&StreamRecord::with_timestamp("cat".to_string(), 1_000))
            .unwrap();
        let second = counter
            .process(&StreamRecord::with_timestamp("cat".to_string(), 20_000))
            .unwrap();
        let next_bucket = counter
            .process(&StreamRecord::with_timestamp("cat".to_string(), 40_000))
            .unwrap();

        assert_eq!((first.count, first.window_start), (1, Some(0)));
        assert_eq!((second.count, second.window_start), (2, Some(0)));
        assert_eq!(second.window_end, Some(30_000));

        // Counter restarts at 1 in the new window.
        assert_eq!(next_bucket.count, 1);
        assert_eq!(next_bucket.window_start, Some(30_000));
        assert_eq!(next_bucket.window_end, Some(60_000));
    }

    #[test]
    fn test_windowed_mode_requires_timestamp() {
        let mode = AggregationMode::TumblingWindow(Duration::from_secs(30));
        let mut counter = CountOperator::new(&mode, InMemoryStateBackend::new());
        let err = counter.process(&record("cat")).unwrap_err();
        assert!(err.to_string().contains("requires record timestamps"));
    }

    #[test]
    fn test_snapshot_restore_continues_counting() {
        let mut counter = global_counter();
        counter.process(&record("the")).unwrap();
        counter.process(&record("the")).unwrap();

        let snapshot = counter.snapshot_state().unwrap();

        let mut restored = global_counter();
        restored.restore_state(&snapshot).unwrap();
        let update = restored.process(&record("the")).unwrap();
        assert_eq!(update.count, 3);
    }

    #[test]
    fn test_batch_emits_one_update_per_increment() {
        let mut counter = global_counter();
        let input = vec![record("the"), record("cat"), record("the")];
        let mut output = Vec::new();
        counter.process_batch(&input, &mut output).unwrap();

        assert_eq!(
            output,
            vec![
                WordCount::global("the".into(), 1),
                WordCount::global("cat".into(), 1),
                WordCount::global("the".into(), 2),
            ]
        );
    }
}
