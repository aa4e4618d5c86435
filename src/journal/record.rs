use crate::FetchError;
use serde_json::Value;

/// Field inside each record carrying its position in the global order
pub const SEQ_FIELD: &str = "match_seq_num";

/// One harvested match record
///
/// The body is an opaque JSON document; the harvester reads only the
/// embedded sequence number, for ordering and recovery.
#[derive(Debug, Clone)]
pub struct MatchRecord {
    seq: u64,
    body: Value,
}

impl MatchRecord {
    /// Wraps a raw API document, extracting its sequence number
    ///
    /// # Returns
    ///
    /// * `Ok(MatchRecord)` - The document carries a numeric sequence field
    /// * `Err(FetchError::MissingSequence)` - The field is absent or not an
    ///   unsigned integer
    pub fn from_value(body: Value) -> Result<Self, FetchError> {
        let seq = body
            .get(SEQ_FIELD)
            .and_then(Value::as_u64)
            .ok_or(FetchError::MissingSequence)?;
        Ok(Self { seq, body })
    }

    /// Sequence number of this record
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// The raw document
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Compact single-line serialization, as written to the journal
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.body)
    }
}
