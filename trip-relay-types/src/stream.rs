use std::{fmt::Display, str::FromStr, sync::Arc};
pub use time::OffsetDateTime as Timestamp;

use crate::{PartitionKeyErr, StreamKeyErr};

/// Maximum string length of a stream key.
pub const MAX_STREAM_KEY_LEN: usize = 128;

/// Maximum length, in characters, of a partition key.
pub const MAX_PARTITION_KEY_LEN: usize = 256;

/// Canonical display format for Timestamp.
pub const TIMESTAMP_FORMAT: &[time::format_description::FormatItem<'static>] =
    time::macros::format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");

/// The current UTC time in [`TIMESTAMP_FORMAT`]. Empty if it cannot be formatted.
pub fn timestamp_now() -> String {
    Timestamp::now_utc()
        .format(TIMESTAMP_FORMAT)
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Identifies a stream by name.
pub struct StreamKey {
    name: Arc<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// The value used to route a record to a shard of a stream.
pub struct PartitionKey {
    key: String,
}

impl StreamKey {
    pub fn new<S: Into<String>>(key: S) -> Result<Self, StreamKeyErr> {
        let key = key.into();
        if is_valid_stream_key(key.as_str()) {
            Ok(Self {
                name: Arc::new(key),
            })
        } else {
            Err(StreamKeyErr::InvalidStreamKey)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartitionKey {
    pub fn new<S: Into<String>>(key: S) -> Result<Self, PartitionKeyErr> {
        let key = key.into();
        let len = key.chars().count();
        if len == 0 {
            Err(PartitionKeyErr::Empty)
        } else if len > MAX_PARTITION_KEY_LEN {
            Err(PartitionKeyErr::TooLong {
                len,
                max: MAX_PARTITION_KEY_LEN,
            })
        } else {
            Ok(Self { key })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }
}

impl Display for StreamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Display for PartitionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key)
    }
}

impl FromStr for StreamKey {
    type Err = StreamKeyErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StreamKey::new(s)
    }
}

impl FromStr for PartitionKey {
    type Err = PartitionKeyErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PartitionKey::new(s)
    }
}

pub fn is_valid_stream_key(s: &str) -> bool {
    !s.is_empty() && s.len() <= MAX_STREAM_KEY_LEN && s.chars().all(is_valid_stream_key_char)
}

/// Returns true if this character can be used in a stream key.
pub fn is_valid_stream_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}
