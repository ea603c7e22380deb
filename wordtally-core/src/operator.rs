//! The operator trait pipeline stages implement.
//!
//! Batch + push-based: input arrives as a slice, outputs are pushed into a
//! caller-owned buffer so the buffer is reused across batches. Stateful
//! operators override the snapshot hooks; stateless ones keep the defaults.

use anyhow::Result;

/// A single transformation stage.
///
/// - **Associated type OUT**: each `Operator<IN>` has exactly one output type.
/// - **Batch input**: `&[IN]` amortizes per-call overhead.
/// - **Push output**: `&mut Vec<OUT>` lets the caller reuse the buffer.
pub trait Operator<IN>: Send {
    /// Output type of this operator.
    type OUT: Send;

    /// Process a batch of input records, pushing outputs to the provided
    /// buffer. The buffer is reused across batches (caller clears it).
    fn process_batch(&mut self, input: &[IN], output: &mut Vec<Self::OUT>) -> Result<()>;

    /// Snapshot operator state into bytes.
    ///
    /// Stateless operators keep the default empty snapshot.
    fn snapshot_state(&self) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    /// Restore operator state from bytes.
    ///
    /// Stateless operators keep the default no-op implementation.
    fn restore_state(&mut self, _data: &[u8]) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Doubler;

    impl Operator<i32> for Doubler {
        type OUT = i32;

        fn process_batch(&mut self, input: &[i32], output: &mut Vec<i32>) -> Result<()> {
            output.reserve(input.len());
            for v in input {
                output.push(v * 2);
            }
            Ok(())
        }
    }

    #[test]
    fn test_stateless_operator_defaults() {
        let mut op = Doubler;
        let mut output = Vec::new();
        op.process_batch(&[1, 2, 3], &mut output).unwrap();
        assert_eq!(output, vec![2, 4, 6]);

        // Default snapshot is empty and restore accepts it.
        let snapshot = op.snapshot_state().unwrap();
        assert!(snapshot.is_empty());
        op.restore_state(&snapshot).unwrap();
    }

    #[test]
    fn test_output_buffer_reuse() {
        let mut op = Doubler;
        let mut output = Vec::with_capacity(8);
        for batch in [[1, 2].as_slice(), [3].as_slice()] {
            output.clear();
            op.process_batch(batch, &mut output).unwrap();
        }
        assert_eq!(output, vec![6]);
    }
}
