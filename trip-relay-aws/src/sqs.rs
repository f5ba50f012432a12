use aws_config::SdkConfig;
use aws_sdk_sqs::{error::DisplayErrorContext, Client};
use std::time::Duration;
use trip_relay_types::{
    export::async_trait::async_trait, FailureQueue, RawMessage, ReceiptToken,
    MAX_RECEIVE_MESSAGES, MAX_WAIT_TIME,
};

use crate::{stream_err, AwsErr, AwsResult};

#[derive(Debug, Clone)]
/// An SQS queue, addressed by its URL.
pub struct SqsQueue {
    client: Client,
    queue_url: String,
}

#[async_trait]
impl FailureQueue for SqsQueue {
    type Error = AwsErr;

    async fn receive(&self, max_messages: usize, wait: Duration) -> AwsResult<Vec<RawMessage>> {
        let max_messages = max_messages.clamp(1, MAX_RECEIVE_MESSAGES) as i32;
        let wait = wait.min(MAX_WAIT_TIME).as_secs() as i32;

        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(max_messages)
            .wait_time_seconds(wait)
            .send()
            .await
            .map_err(|e| stream_err(AwsErr::Sqs(DisplayErrorContext(&e).to_string())))?;

        let mut messages = Vec::new();
        for message in output.messages() {
            match (message.body(), message.receipt_handle()) {
                (Some(body), Some(handle)) => messages.push(RawMessage {
                    message_id: message.message_id().map(str::to_owned),
                    body: body.to_owned(),
                    receipt: ReceiptToken::new(handle),
                }),
                _ => log::warn!(
                    "Ignoring message {:?} without body or receipt handle",
                    message.message_id()
                ),
            }
        }
        Ok(messages)
    }

    async fn delete(&self, receipt: ReceiptToken) -> AwsResult<()> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt.as_str())
            .send()
            .await
            .map_err(|e| stream_err(AwsErr::Sqs(DisplayErrorContext(&e).to_string())))?;
        Ok(())
    }
}

impl SqsQueue {
    pub fn new<S: Into<String>>(config: &SdkConfig, queue_url: S) -> Self {
        Self::from_client(Client::new(config), queue_url)
    }

    pub fn from_client<S: Into<String>>(client: Client, queue_url: S) -> Self {
        Self {
            client,
            queue_url: queue_url.into(),
        }
    }

    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }
}
