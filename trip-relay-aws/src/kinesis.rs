use aws_config::SdkConfig;
use aws_sdk_kinesis::{
    error::DisplayErrorContext, primitives::Blob, types::PutRecordsRequestEntry, Client,
};
use trip_relay_types::{
    export::async_trait::async_trait, PutRecordResult, PutResult, StreamKey, StreamRecord,
    StreamService,
};

use crate::{stream_err, AwsErr, AwsResult};

#[derive(Debug, Clone)]
/// A Kinesis data stream client.
pub struct KinesisStream {
    client: Client,
}

#[async_trait]
impl StreamService for KinesisStream {
    type Error = AwsErr;

    async fn put_records(
        &self,
        stream: &StreamKey,
        records: &[StreamRecord],
    ) -> AwsResult<PutResult> {
        let entries = records
            .iter()
            .map(|record| {
                PutRecordsRequestEntry::builder()
                    .data(Blob::new(record.payload().to_vec()))
                    .partition_key(record.partition_key().as_str())
                    .build()
                    .map_err(|e| stream_err(AwsErr::Build(e.to_string())))
            })
            .collect::<AwsResult<Vec<_>>>()?;

        let output = self
            .client
            .put_records()
            .stream_name(stream.name())
            .set_records(Some(entries))
            .send()
            .await
            .map_err(|e| stream_err(AwsErr::Kinesis(DisplayErrorContext(&e).to_string())))?;

        let results = output
            .records()
            .iter()
            .map(|entry| PutRecordResult {
                error_code: entry.error_code().map(str::to_owned),
                error_message: entry.error_message().map(str::to_owned),
            })
            .collect();

        Ok(PutResult {
            failed_count: output.failed_record_count().unwrap_or(0).max(0) as usize,
            results,
        })
    }
}

impl KinesisStream {
    pub fn new(config: &SdkConfig) -> Self {
        Self::from_client(Client::new(config))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}
