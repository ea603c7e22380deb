//! The staged pipeline: source task, hash-partitioned counter tasks,
//! collector.
//!
//! ```text
//! Source Task (1 thread: decode, tokenize, rekey)
//!     |
//!     | Hash Partition (by token)
//!     v
//! Counter Tasks (parallelism threads, one keyed store each)
//!     |
//!     v
//! Collector (calling thread) -> Sink
//! ```
//!
//! All occurrences of a token route to one counter task and channels are
//! FIFO, so updates for a given word are applied and published in arrival
//! order. Publish order across different words is unspecified.

use std::thread;

use anyhow::{anyhow, Result};
use tracing::{debug, info};

use crate::channel::local_channel;
use crate::config::PipelineConfig;
use crate::count::CountOperator;
use crate::operator::Operator;
use crate::partitioner::{HashPartitioner, Partitioner};
use crate::state::InMemoryStateBackend;
use crate::tokenize::Tokenizer;
use crate::types::{StreamElement, StreamRecord, TextRecord, Token, WordCount};

/// Publish target for count updates.
///
/// Publish order within a word is preserved; order across words is not.
pub trait Sink {
    fn publish(&mut self, update: WordCount) -> Result<()>;
}

/// Sink that collects every update in memory. Used by tests and the CLI.
#[derive(Debug, Default)]
pub struct VecSink {
    pub records: Vec<WordCount>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sink for VecSink {
    fn publish(&mut self, update: WordCount) -> Result<()> {
        self.records.push(update);
        Ok(())
    }
}

/// A configured word-count pipeline.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline, validating the configuration.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run the pipeline over a bounded source, publishing every count
    /// update to `sink`. Returns when the source is exhausted and all
    /// updates have been published.
    pub fn run<I, S>(&self, source: I, sink: &mut S) -> Result<()>
    where
        I: IntoIterator<Item = TextRecord> + Send + 'static,
        S: Sink,
    {
        let parallelism = self.config.parallelism;
        let capacity = self.config.channel_capacity;
        info!(
            parallelism,
            mode = ?self.config.mode,
            store = %self.config.store_name,
            "starting word-count pipeline"
        );

        // Channels: source -> counter tasks (one each), counters -> collector (shared).
        let mut token_senders = Vec::with_capacity(parallelism);
        let mut token_receivers = Vec::with_capacity(parallelism);
        for _ in 0..parallelism {
            let (sender, receiver) = local_channel::<Token>(capacity);
            token_senders.push(sender);
            token_receivers.push(receiver);
        }
        let (collector_sender, collector_receiver) = local_channel::<WordCount>(capacity);

        // Source task: decode, tokenize, rekey, hash-partition.
        let mut tokenizer = Tokenizer::new(self.config.decode_policy);
        let source_handle = thread::spawn(move || -> Result<()> {
            let partitioner = HashPartitioner::new(|rec: &StreamRecord<Token>| rec.value.clone());
            let mut tokens = Vec::new();
            for record in source {
                tokenizer.process_batch(std::slice::from_ref(&record), &mut tokens)?;
                for token_record in tokens.drain(..) {
                    let partition = partitioner.partition(&token_record, parallelism);
                    token_senders[partition].send(StreamElement::Record(token_record))?;
                }
            }
            for sender in &token_senders {
                sender.send(StreamElement::End)?;
            }
            Ok(())
        });

        // Counter tasks: exclusive store per partition, one update emitted
        // per increment.
        let mut counter_handles = Vec::with_capacity(parallelism);
        for (task_id, receiver) in token_receivers.into_iter().enumerate() {
            let sender = collector_sender.clone();
            let mut counter = CountOperator::new(
                &self.config.mode,
                InMemoryStateBackend::named(self.config.store_name.clone()),
            );
            let handle = thread::spawn(move || -> Result<()> {
                loop {
                    match receiver.recv()? {
                        StreamElement::Record(record) => {
                            let update = counter.process(&record)?;
                            sender.send(StreamElement::record(update))?;
                        }
                        StreamElement::End => {
                            sender.send(StreamElement::End)?;
                            debug!(task_id, "counter task finished");
                            break;
                        }
                    }
                }
                Ok(())
            });
            counter_handles.push(handle);
        }
        // The counter tasks hold the only remaining senders; dropping ours
        // lets the collector observe disconnection if they all fail.
        drop(collector_sender);

        // Collector: publish updates until every counter task has ended.
        let mut ended = 0;
        let mut collect_err: Option<anyhow::Error> = None;
        while ended < parallelism {
            match collector_receiver.recv() {
                Ok(StreamElement::Record(record)) => {
                    if let Err(err) = sink.publish(record.value) {
                        collect_err = Some(err);
                        break;
                    }
                }
                Ok(StreamElement::End) => ended += 1,
                Err(err) => {
                    collect_err = Some(err);
                    break;
                }
            }
        }

        // Unblock any task still sending before joining.
        drop(collector_receiver);

        source_handle
            .join()
            .map_err(|_| anyhow!("source task panicked"))??;
        for handle in counter_handles {
            handle
                .join()
                .map_err(|_| anyhow!("counter task panicked"))??;
        }
        if let Some(err) = collect_err {
            return Err(err);
        }

        debug!("pipeline complete");
        Ok(())
    }

    /// Run the pipeline and return every emitted update in publish order.
    pub fn run_collect<I>(&self, source: I) -> Result<Vec<WordCount>>
    where
        I: IntoIterator<Item = TextRecord> + Send + 'static,
    {
        let mut sink = VecSink::new();
        self.run(source, &mut sink)?;
        Ok(sink.records)
    }
}
