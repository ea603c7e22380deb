//! Pipeline configuration.
//!
//! Topic names, window size, and store name are deployment configuration
//! owned by the surrounding application; this module is the surface it
//! hands them over on.

use std::time::Duration;

use anyhow::{bail, Result};

use crate::state::DEFAULT_STORE_NAME;

/// Window size used by the original deployment of the windowed variant.
pub const DEFAULT_WINDOW_SIZE: Duration = Duration::from_millis(30_000);

/// How word counts accumulate. Exactly one policy per pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregationMode {
    /// One counter per token for the lifetime of the store; output
    /// records carry no window bounds.
    Global,
    /// One counter per (token, window) pair; records must carry event
    /// times and outputs carry the window's bounds.
    TumblingWindow(Duration),
}

/// What to do with a record whose value is not valid UTF-8.
///
/// A plain choice the deployment must make; there is no silent default
/// behavior inherited from the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodePolicy {
    /// Drop the record, log a warning, keep going.
    Skip,
    /// Fail the whole pipeline run.
    Fail,
}

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub mode: AggregationMode,
    /// Number of counter tasks. Counters for a given token always live
    /// on exactly one task.
    pub parallelism: usize,
    /// Bounded channel capacity between stages (backpressure knob).
    pub channel_capacity: usize,
    /// Logical name of the aggregation store.
    pub store_name: String,
    pub decode_policy: DecodePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: AggregationMode::Global,
            parallelism: 1,
            channel_capacity: 1024,
            store_name: DEFAULT_STORE_NAME.to_string(),
            decode_policy: DecodePolicy::Skip,
        }
    }
}

impl PipelineConfig {
    /// Validate the configuration before a run.
    pub fn validate(&self) -> Result<()> {
        if self.parallelism == 0 {
            bail!("parallelism must be greater than 0");
        }
        if self.channel_capacity == 0 {
            bail!("channel_capacity must be greater than 0");
        }
        if let AggregationMode::TumblingWindow(size) = self.mode {
            if size.is_zero() {
                bail!("tumbling window size must be non-zero");
            }
        }
        Ok(())
    }
}
