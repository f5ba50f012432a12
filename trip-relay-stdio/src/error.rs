use thiserror::Error;
use trip_relay_types::StreamResult;

#[derive(Error, Debug)]
pub enum StdioErr {
    #[error("IO Error: {0}")]
    IoError(std::io::Error),
    #[error("Output lock poisoned")]
    Poisoned,
}

pub type StdioResult<T> = StreamResult<T, StdioErr>;
