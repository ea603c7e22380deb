//! Tokenization: lowercase the text, split on maximal runs of non-word
//! characters, discard empties.
//!
//! A word character is ASCII alphanumeric or `_`. "The cat sat. The DOG
//! sat!" tokenizes to `["the", "cat", "sat", "the", "dog", "sat"]`.

use anyhow::{bail, Result};
use tracing::warn;

use crate::config::DecodePolicy;
use crate::operator::Operator;
use crate::types::{StreamRecord, TextRecord, Token};

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Split `text` into lowercase tokens. Pure function: the same input
/// always yields the same token sequence.
pub fn tokenize(text: &str) -> Vec<Token> {
    text.to_lowercase()
        .split(|c: char| !is_word_char(c))
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

/// The tokenize + rekey stage.
///
/// Decodes each record's value as UTF-8 and emits one [`StreamRecord`] per
/// token, carrying the input record's event time forward. The token itself
/// becomes the routing key downstream, so every occurrence of the same
/// word reaches the same counter partition.
pub struct Tokenizer {
    decode_policy: DecodePolicy,
}

impl Tokenizer {
    pub fn new(decode_policy: DecodePolicy) -> Self {
        Self { decode_policy }
    }

    /// Tokenize a single record.
    ///
    /// A value that is not valid UTF-8 yields no tokens under
    /// [`DecodePolicy::Skip`] (logged) and an error under
    /// [`DecodePolicy::Fail`].
    pub fn tokens(&self, record: &TextRecord) -> Result<Vec<Token>> {
        match std::str::from_utf8(&record.value) {
            Ok(text) => Ok(tokenize(text)),
            Err(err) => match self.decode_policy {
                DecodePolicy::Skip => {
                    warn!(key = ?record.key, %err, "skipping record with non-UTF-8 value");
                    Ok(Vec::new())
                }
                DecodePolicy::Fail => bail!("record value is not valid UTF-8: {err}"),
            },
        }
    }
}

impl Operator<TextRecord> for Tokenizer {
    type OUT = StreamRecord<Token>;

    fn process_batch(
        &mut self,
        input: &[TextRecord],
        output: &mut Vec<StreamRecord<Token>>,
    ) -> Result<()> {
        for record in input {
            for token in self.tokens(record)? {
                output.push(StreamRecord {
                    value: token,
                    timestamp: record.timestamp,
                });
            }
        }
        Ok(())
    }
}
