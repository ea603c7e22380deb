use serde::{Deserialize, Serialize};

/// Event time in milliseconds since epoch.
pub type EventTime = i64;

/// A single word extracted from input text after lowercasing and
/// punctuation splitting. Always non-empty.
pub type Token = String;

/// An input text record as delivered by the stream source.
///
/// The key is opaque and ignored by the transform; only the value is
/// tokenized. The value is raw bytes because the source makes no promise
/// beyond "UTF-8 expected" — decoding is the pipeline's problem, governed
/// by [`DecodePolicy`](crate::config::DecodePolicy).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextRecord {
    pub key: Option<Vec<u8>>,
    pub value: Vec<u8>,
    pub timestamp: Option<EventTime>,
}

impl TextRecord {
    /// Create a record from a text value, no key, no event time.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            key: None,
            value: value.into().into_bytes(),
            timestamp: None,
        }
    }

    /// Create a record with an explicit event time (required for the
    /// windowed aggregation mode).
    pub fn with_timestamp(value: impl Into<String>, timestamp: EventTime) -> Self {
        Self {
            key: None,
            value: value.into().into_bytes(),
            timestamp: Some(timestamp),
        }
    }

    /// Create a record from raw bytes, possibly not valid UTF-8.
    pub fn from_bytes(value: Vec<u8>) -> Self {
        Self {
            key: None,
            value,
            timestamp: None,
        }
    }

    /// Attach an opaque routing key.
    pub fn with_key(mut self, key: Vec<u8>) -> Self {
        self.key = Some(key);
        self
    }
}

/// One cumulative count update, emitted once per increment.
///
/// `window_start`/`window_end` are populated only in the windowed
/// aggregation mode; in global mode both are absent. Immutable once
/// emitted — the output stream is append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WordCount {
    pub word: Token,
    pub count: u64,
    pub window_start: Option<EventTime>,
    pub window_end: Option<EventTime>,
}

impl WordCount {
    /// An update from the global (unwindowed) counter.
    pub fn global(word: Token, count: u64) -> Self {
        Self {
            word,
            count,
            window_start: None,
            window_end: None,
        }
    }

    /// An update scoped to a time window.
    pub fn windowed(word: Token, count: u64, start: EventTime, end: EventTime) -> Self {
        Self {
            word,
            count,
            window_start: Some(start),
            window_end: Some(end),
        }
    }
}

impl std::fmt::Display for WordCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.window_start, self.window_end) {
            (Some(start), Some(end)) => {
                write!(f, "{}: {} [{}, {})", self.word, self.count, start, end)
            }
            _ => write!(f, "{}: {}", self.word, self.count),
        }
    }
}

/// A record flowing between pipeline stages, carrying user data and
/// optional event time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamRecord<T> {
    pub value: T,
    pub timestamp: Option<EventTime>,
}

impl<T> StreamRecord<T> {
    /// Create a record with no event time.
    pub fn new(value: T) -> Self {
        Self {
            value,
            timestamp: None,
        }
    }

    /// Create a record with an explicit event time.
    pub fn with_timestamp(value: T, timestamp: EventTime) -> Self {
        Self {
            value,
            timestamp: Some(timestamp),
        }
    }
}

/// The unit flowing through pipeline channels: data records and the
/// end-of-stream marker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum StreamElement<T> {
    /// User data record.
    Record(StreamRecord<T>),
    /// End of bounded stream. Each upstream task sends exactly one.
    End,
}

impl<T> StreamElement<T> {
    /// Create a record element with no timestamp.
    pub fn record(value: T) -> Self {
        Self::Record(StreamRecord::new(value))
    }

    /// Create a record element with a timestamp.
    pub fn timestamped_record(value: T, timestamp: EventTime) -> Self {
        Self::Record(StreamRecord::with_timestamp(value, timestamp))
    }
}

/// Trait bound for types that can flow through the pipeline.
pub trait StreamData: Send + Clone + Serialize + for<'de> Deserialize<'de> + 'static {}

// Blanket implementation: any type satisfying the bounds is StreamData.
impl<T> StreamData for T where T: Send + Clone + Serialize + for<'de> Deserialize<'de> + 'static {}
