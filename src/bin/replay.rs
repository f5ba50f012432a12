use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use trip_relay::{
    aws::{AwsOptions, DynamoStore, SqsQueue, DEFAULT_REGION},
    parse_duration, ReplayConsumer, ReplayOptions, DEFAULT_ID_FIELD,
};

#[derive(Debug, Parser)]
/// Drain the dead-letter queue into the trip table, then exit.
struct Args {
    #[arg(long, env = "SQS_URL", help = "URL of the dead-letter queue")]
    sqs_url: String,
    #[arg(long, env = "SOURCE_TABLE", help = "DynamoDB table holding the trips")]
    source_table: String,
    #[arg(long, default_value = DEFAULT_ID_FIELD)]
    id_field: String,
    #[arg(long, env = "AWS_REGION", default_value = DEFAULT_REGION)]
    region: String,
    #[arg(long, help = "Custom AWS endpoint, e.g. for LocalStack")]
    endpoint_url: Option<String>,
    #[arg(long, help = "How long each poll waits for a message", value_parser = parse_duration)]
    wait_time: Option<Duration>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        sqs_url,
        source_table,
        id_field,
        region,
        endpoint_url,
        wait_time,
    } = Args::parse();

    let mut aws = AwsOptions::default();
    aws.set_region(region);
    if let Some(url) = endpoint_url {
        aws.set_endpoint_url(url);
    }
    let config = aws.load().await;

    let mut options = ReplayOptions::default();
    options.set_id_field(id_field.as_str());
    if let Some(wait) = wait_time {
        options.set_wait_time(wait);
    }

    let queue = SqsQueue::new(&config, sqs_url);
    let store = DynamoStore::new(&config, source_table, id_field);
    let report = ReplayConsumer::new(queue, store, options).run().await?;

    if report.failed > 0 || report.skipped > 0 {
        log::warn!(
            "{} messages remain on the queue ({} skipped, {} failed)",
            report.skipped + report.failed,
            report.skipped,
            report.failed
        );
    }

    Ok(())
}
