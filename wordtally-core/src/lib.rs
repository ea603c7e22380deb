//! # Wordtally Core
//!
//! A staged word-count stream pipeline: text records in, cumulative
//! `(word, count)` updates out.
//!
//! The pipeline is built from explicit stages connected by bounded channels:
//!
//! ```text
//! Source Task (tokenize + rekey)
//!     |
//!     | Hash Partition (by token)
//!     v
//! Counter Tasks (one keyed store per partition)
//!     |
//!     v
//! Collector -> Sink
//! ```
//!
//! - [`types`] — [`TextRecord`](types::TextRecord), [`WordCount`](types::WordCount),
//!   and the stream plumbing: [`StreamElement`](types::StreamElement),
//!   [`StreamRecord`](types::StreamRecord), the [`StreamData`](types::StreamData) bound.
//! - [`tokenize`] — lowercasing, punctuation-splitting [`Tokenizer`](tokenize::Tokenizer).
//! - [`operator`] — the batch [`Operator`](operator::Operator) trait stages implement.
//! - [`state`] — [`KeyedStateBackend`](state::KeyedStateBackend) and the in-memory
//!   counter store backing the running counts.
//! - [`count`] — [`CountOperator`](count::CountOperator): get-or-zero, increment,
//!   emit the new cumulative count.
//! - [`window`] — [`TumblingWindows`](window::TumblingWindows) assignment for the
//!   windowed aggregation mode.
//! - [`partitioner`] — hash routing so every occurrence of a token lands on the
//!   same counter task.
//! - [`channel`] — bounded channels carrying [`StreamElement`](types::StreamElement)s
//!   between tasks.
//! - [`pipeline`] — [`Pipeline`](pipeline::Pipeline): wires the stages together and
//!   runs them to completion.
//! - [`config`] — [`PipelineConfig`](config::PipelineConfig) and the aggregation
//!   mode toggle.

pub mod channel;
pub mod config;
pub mod count;
pub mod operator;
pub mod partitioner;
pub mod pipeline;
pub mod state;
pub mod tokenize;
pub mod types;
pub mod window;
