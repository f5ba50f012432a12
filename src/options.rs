use std::time::Duration;
use thiserror::Error;
use trip_relay_types::{BatchSize, StreamKey, MAX_RECEIVE_MESSAGES, MAX_WAIT_TIME};

/// The field identifying a trip. Used as partition key and as store key.
pub const DEFAULT_ID_FIELD: &str = "trip_id";
pub const DEFAULT_START_STREAM: &str = "start-trip-stream";
pub const DEFAULT_END_STREAM: &str = "end-trip-stream";

/// How long one replay poll waits for a message to arrive.
pub const DEFAULT_WAIT_TIME: Duration = Duration::from_secs(5);
pub const DEFAULT_MIN_PAUSE: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_PAUSE: Duration = Duration::from_secs(2);
pub const DEFAULT_CYCLE_PAUSE: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct MapperOptions {
    partition_key_field: String,
}

#[derive(Debug, Default, Clone)]
pub struct PublisherOptions {
    batch_size: BatchSize,
}

#[derive(Debug, Clone)]
/// Settings of a [`crate::SimulationDriver`] run.
///
/// Between the two publishes of a cycle the driver pauses for a random duration in `[min_pause, max_pause)`,
/// and after each cycle for `cycle_pause`.
pub struct DriverOptions {
    batch_size: BatchSize,
    start_stream: StreamKey,
    end_stream: StreamKey,
    min_pause: Duration,
    max_pause: Duration,
    cycle_pause: Duration,
}

#[derive(Debug, Clone)]
pub struct ReplayOptions {
    id_field: String,
    max_messages: usize,
    wait_time: Duration,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseDurationErr {
    #[error("Missing number in duration `{0}`")]
    MissingNumber(String),
    #[error("Unknown unit `{unit}`: expected one of ns, us, ms, s, m")]
    UnknownUnit { unit: String },
    #[error("Duration `{0}` is out of range")]
    OutOfRange(String),
}

impl Default for MapperOptions {
    fn default() -> Self {
        Self {
            partition_key_field: DEFAULT_ID_FIELD.to_owned(),
        }
    }
}

impl MapperOptions {
    pub fn partition_key_field(&self) -> &str {
        &self.partition_key_field
    }

    pub fn set_partition_key_field<S: Into<String>>(&mut self, field: S) -> &mut Self {
        self.partition_key_field = field.into();
        self
    }
}

impl PublisherOptions {
    pub fn batch_size(&self) -> BatchSize {
        self.batch_size
    }

    pub fn set_batch_size(&mut self, size: BatchSize) -> &mut Self {
        self.batch_size = size;
        self
    }
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            batch_size: BatchSize::default(),
            start_stream: StreamKey::new(DEFAULT_START_STREAM).expect("Valid stream key"),
            end_stream: StreamKey::new(DEFAULT_END_STREAM).expect("Valid stream key"),
            min_pause: DEFAULT_MIN_PAUSE,
            max_pause: DEFAULT_MAX_PAUSE,
            cycle_pause: DEFAULT_CYCLE_PAUSE,
        }
    }
}

impl DriverOptions {
    pub fn batch_size(&self) -> BatchSize {
        self.batch_size
    }

    pub fn set_batch_size(&mut self, size: BatchSize) -> &mut Self {
        self.batch_size = size;
        self
    }

    pub fn start_stream(&self) -> &StreamKey {
        &self.start_stream
    }

    pub fn set_start_stream(&mut self, stream: StreamKey) -> &mut Self {
        self.start_stream = stream;
        self
    }

    pub fn end_stream(&self) -> &StreamKey {
        &self.end_stream
    }

    pub fn set_end_stream(&mut self, stream: StreamKey) -> &mut Self {
        self.end_stream = stream;
        self
    }

    pub fn min_pause(&self) -> Duration {
        self.min_pause
    }

    pub fn max_pause(&self) -> Duration {
        self.max_pause
    }

    /// Pause between the two publishes of a cycle. If `max <= min`, the pause is always `min`.
    pub fn set_pause(&mut self, min: Duration, max: Duration) -> &mut Self {
        self.min_pause = min;
        self.max_pause = max;
        self
    }

    pub fn cycle_pause(&self) -> Duration {
        self.cycle_pause
    }

    pub fn set_cycle_pause(&mut self, pause: Duration) -> &mut Self {
        self.cycle_pause = pause;
        self
    }

    /// Do not pause at all. Meant for tests.
    pub fn set_no_pause(&mut self) -> &mut Self {
        self.set_pause(Duration::ZERO, Duration::ZERO)
            .set_cycle_pause(Duration::ZERO)
    }
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            id_field: DEFAULT_ID_FIELD.to_owned(),
            max_messages: MAX_RECEIVE_MESSAGES,
            wait_time: DEFAULT_WAIT_TIME,
        }
    }
}

impl ReplayOptions {
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    pub fn set_id_field<S: Into<String>>(&mut self, field: S) -> &mut Self {
        self.id_field = field.into();
        self
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    /// Clamped to `1..=MAX_RECEIVE_MESSAGES`.
    pub fn set_max_messages(&mut self, n: usize) -> &mut Self {
        self.max_messages = n.clamp(1, MAX_RECEIVE_MESSAGES);
        self
    }

    pub fn wait_time(&self) -> Duration {
        self.wait_time
    }

    /// Capped at [`MAX_WAIT_TIME`]. A zero wait ends the run as soon as the queue looks empty.
    pub fn set_wait_time(&mut self, wait: Duration) -> &mut Self {
        self.wait_time = wait.min(MAX_WAIT_TIME);
        self
    }
}

/// Parse durations like `500ms`, `1s`, `2m`. A bare number is seconds.
pub fn parse_duration(s: &str) -> Result<Duration, ParseDurationErr> {
    let s = s.trim();
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);
    let number: f64 = number
        .parse()
        .map_err(|_| ParseDurationErr::MissingNumber(s.to_owned()))?;
    let secs = match unit.trim() {
        "ns" => number / 1e9,
        "us" => number / 1e6,
        "ms" => number / 1e3,
        "" | "s" => number,
        "m" => number * 60.0,
        unit => {
            return Err(ParseDurationErr::UnknownUnit {
                unit: unit.to_owned(),
            })
        }
    };
    Duration::try_from_secs_f64(secs).map_err(|_| ParseDurationErr::OutOfRange(s.to_owned()))
}
