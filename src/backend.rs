use std::{fmt::Display, str::FromStr};

#[cfg(feature = "trip-relay-aws")]
use trip_relay_aws::KinesisStream;
use trip_relay_memory::MemoryStream;
use trip_relay_stdio::StdioStream;
use trip_relay_types::{
    export::async_trait::async_trait, PutResult, StreamKey, StreamRecord, StreamService,
};

use crate::{map_err, BackendErr, RelayResult};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
/// `trip-relay` Enum for identifying the underlying stream backend.
pub enum Backend {
    Aws,
    Stdio,
    Memory,
}

#[derive(Debug, Clone)]
/// `trip-relay` a [`StreamService`] whose backend is chosen at runtime.
pub struct RelayStream {
    backend: RelayStreamBackend,
}

#[derive(Debug, Clone)]
enum RelayStreamBackend {
    #[cfg(feature = "trip-relay-aws")]
    Aws(KinesisStream),
    Stdio(StdioStream),
    Memory(MemoryStream),
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aws" | "kinesis" => Ok(Self::Aws),
            "stdio" => Ok(Self::Stdio),
            "memory" => Ok(Self::Memory),
            _ => Err(format!("unknown Backend `{s}`: expected aws, stdio or memory")),
        }
    }
}

impl Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Aws => write!(f, "aws"),
            Self::Stdio => write!(f, "stdio"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

#[cfg(feature = "trip-relay-aws")]
impl From<KinesisStream> for RelayStream {
    fn from(i: KinesisStream) -> Self {
        Self {
            backend: RelayStreamBackend::Aws(i),
        }
    }
}

impl From<StdioStream> for RelayStream {
    fn from(i: StdioStream) -> Self {
        Self {
            backend: RelayStreamBackend::Stdio(i),
        }
    }
}

impl From<MemoryStream> for RelayStream {
    fn from(i: MemoryStream) -> Self {
        Self {
            backend: RelayStreamBackend::Memory(i),
        }
    }
}

impl RelayStream {
    /// Identifies the underlying backend
    pub fn backend(&self) -> Backend {
        match self.backend {
            #[cfg(feature = "trip-relay-aws")]
            RelayStreamBackend::Aws(_) => Backend::Aws,
            RelayStreamBackend::Stdio(_) => Backend::Stdio,
            RelayStreamBackend::Memory(_) => Backend::Memory,
        }
    }

    /// Get the concrete type for the Stdio backend. None if it's another Backend
    pub fn get_stdio(&self) -> Option<&StdioStream> {
        match &self.backend {
            RelayStreamBackend::Stdio(s) => Some(s),
            _ => None,
        }
    }

    /// Get the concrete type for the Memory backend. None if it's another Backend
    pub fn get_memory(&self) -> Option<&MemoryStream> {
        match &self.backend {
            RelayStreamBackend::Memory(s) => Some(s),
            _ => None,
        }
    }

    #[cfg(feature = "trip-relay-aws")]
    /// Get the concrete type for the Aws backend. None if it's another Backend
    pub fn get_aws(&self) -> Option<&KinesisStream> {
        match &self.backend {
            RelayStreamBackend::Aws(s) => Some(s),
            _ => None,
        }
    }
}

#[async_trait]
impl StreamService for RelayStream {
    type Error = BackendErr;

    async fn put_records(
        &self,
        stream: &StreamKey,
        records: &[StreamRecord],
    ) -> RelayResult<PutResult> {
        match &self.backend {
            #[cfg(feature = "trip-relay-aws")]
            RelayStreamBackend::Aws(i) => i.put_records(stream, records).await.map_err(map_err),
            RelayStreamBackend::Stdio(i) => i.put_records(stream, records).await.map_err(map_err),
            RelayStreamBackend::Memory(i) => i.put_records(stream, records).await.map_err(map_err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{PublisherOptions, StreamPublisher};
    use trip_relay_memory::Reply;
    use trip_relay_types::{Batch, PartitionKey, StreamErr};

    #[test]
    fn test_parse_backend() {
        assert_eq!("aws".parse(), Ok(Backend::Aws));
        assert_eq!("stdio".parse(), Ok(Backend::Stdio));
        assert_eq!("memory".parse(), Ok(Backend::Memory));
        assert!("kafka".parse::<Backend>().is_err());
        assert_eq!(Backend::Stdio.to_string(), "stdio");
    }

    #[tokio::test]
    async fn test_relay_memory() {
        let memory = MemoryStream::new();
        memory.script(Reply::Unavailable);
        let relay = RelayStream::from(memory.clone());
        assert_eq!(relay.backend(), Backend::Memory);
        assert!(relay.get_stdio().is_none());

        let key = StreamKey::new("trips").unwrap();
        let record = StreamRecord::new(b"{}".to_vec(), PartitionKey::new("A1").unwrap());
        let err = relay
            .put_records(&key, std::slice::from_ref(&record))
            .await
            .unwrap_err();
        match err {
            StreamErr::Backend(e) => assert_eq!(e.backend(), Backend::Memory),
            e => panic!("unexpected error {e}"),
        }

        let publisher = StreamPublisher::new(relay, PublisherOptions::default());
        let outcome = publisher
            .publish(&Batch::new(vec![record]).unwrap(), &key)
            .await;
        assert!(outcome.is_complete());
        assert_eq!(memory.records(&key).len(), 1);
    }
}
