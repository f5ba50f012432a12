use anyhow::Result;
use clap::Parser;
use std::{path::PathBuf, time::Duration};
use trip_relay::{
    aws::{AwsOptions, KinesisStream, DEFAULT_REGION},
    load_rows, parse_duration,
    stdio::StdioStream,
    Backend, BatchSize, DriverOptions, MapperOptions, RecordMapper, RelayStream, SimulationDriver,
    StreamKey, DEFAULT_CYCLE_PAUSE, DEFAULT_END_STREAM, DEFAULT_ID_FIELD, DEFAULT_MAX_PAUSE,
    DEFAULT_MIN_PAUSE, DEFAULT_START_STREAM,
};

#[derive(Debug, Parser)]
/// Replay trip start and end events into two streams, batch by batch, in lockstep.
struct Args {
    #[arg(long, help = "Trip start rows, one JSON object per line", default_value = "data/start_taxi_trips.ndjson")]
    start: PathBuf,
    #[arg(long, help = "Trip end rows, one JSON object per line", default_value = "data/end_taxi_trips.ndjson")]
    end: PathBuf,
    #[arg(long, help = "Where to publish: `aws` or `stdio`", default_value = "aws")]
    backend: Backend,
    #[arg(long, default_value = DEFAULT_START_STREAM)]
    start_stream: StreamKey,
    #[arg(long, default_value = DEFAULT_END_STREAM)]
    end_stream: StreamKey,
    #[arg(long, help = "Records per publish request", default_value = "10")]
    batch_size: BatchSize,
    #[arg(long, help = "Field to route records by", default_value = DEFAULT_ID_FIELD)]
    partition_key: String,
    #[arg(long, env = "AWS_REGION", default_value = DEFAULT_REGION)]
    region: String,
    #[arg(long, help = "Custom AWS endpoint, e.g. for LocalStack")]
    endpoint_url: Option<String>,
    #[arg(long, help = "Shortest pause between the start and end batch", value_parser = parse_duration)]
    min_pause: Option<Duration>,
    #[arg(long, help = "Longest pause between the start and end batch", value_parser = parse_duration)]
    max_pause: Option<Duration>,
    #[arg(long, help = "Pause after each cycle", value_parser = parse_duration)]
    cycle_pause: Option<Duration>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        start,
        end,
        backend,
        start_stream,
        end_stream,
        batch_size,
        partition_key,
        region,
        endpoint_url,
        min_pause,
        max_pause,
        cycle_pause,
    } = Args::parse();

    let mut mapper_options = MapperOptions::default();
    mapper_options.set_partition_key_field(partition_key);
    let mapper = RecordMapper::new(mapper_options);

    log::info!("Loading trip start rows");
    let start = mapper.map_rows(load_rows(&start)?).records;
    log::info!("Loading trip end rows");
    let end = mapper.map_rows(load_rows(&end)?).records;

    let stream: RelayStream = match backend {
        Backend::Aws => {
            log::info!("Initializing Kinesis client...");
            let mut options = AwsOptions::default();
            options.set_region(region);
            if let Some(url) = endpoint_url {
                options.set_endpoint_url(url);
            }
            KinesisStream::new(&options.load().await).into()
        }
        Backend::Stdio => StdioStream::new().into(),
        Backend::Memory => anyhow::bail!("The memory backend keeps nothing; use `stdio` for a dry run"),
    };

    let mut options = DriverOptions::default();
    options
        .set_batch_size(batch_size)
        .set_start_stream(start_stream)
        .set_end_stream(end_stream)
        .set_pause(
            min_pause.unwrap_or(DEFAULT_MIN_PAUSE),
            max_pause.unwrap_or(DEFAULT_MAX_PAUSE),
        )
        .set_cycle_pause(cycle_pause.unwrap_or(DEFAULT_CYCLE_PAUSE));

    let report = SimulationDriver::new(stream, options).run(&start, &end).await;
    log::info!(
        "Sent {}/{} start trips and {}/{} end trips in {} cycles",
        report.start.succeeded,
        start.len(),
        report.end.succeeded,
        end.len(),
        report.cycles
    );

    Ok(())
}
