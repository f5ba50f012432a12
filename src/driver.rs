use trip_relay_runtime::{sleep, sleep_between};
use trip_relay_types::{slice_at, timestamp_now, PublishTotals, StreamRecord, StreamService};

use crate::{DriverOptions, PublisherOptions, StreamPublisher};

#[derive(Debug)]
/// Replays two flows of trip events, starts and ends, through one publisher with human-observable pacing.
///
/// Both flows advance on one shared offset: each cycle sends `start[offset..offset + n]`,
/// pauses briefly, then sends `end[offset..offset + n]`. The run lasts as many cycles as the start flow has batches,
/// so if the flows differ in length, the end flow is either cut short or padded with empty (unsent) slices.
pub struct SimulationDriver<S: StreamService> {
    publisher: StreamPublisher<S>,
    options: DriverOptions,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DriverReport {
    pub cycles: usize,
    pub start: PublishTotals,
    pub end: PublishTotals,
}

impl<S: StreamService> SimulationDriver<S> {
    pub fn new(service: S, options: DriverOptions) -> Self {
        let mut publisher_options = PublisherOptions::default();
        publisher_options.set_batch_size(options.batch_size());
        Self {
            publisher: StreamPublisher::new(service, publisher_options),
            options,
        }
    }

    pub fn publisher(&self) -> &StreamPublisher<S> {
        &self.publisher
    }

    pub fn options(&self) -> &DriverOptions {
        &self.options
    }

    pub async fn run(&self, start: &[StreamRecord], end: &[StreamRecord]) -> DriverReport {
        let size = self.options.batch_size();
        let start_stream = self.options.start_stream();
        let end_stream = self.options.end_stream();
        if start.len() != end.len() {
            log::warn!(
                "Flows differ in length: {} starts, {} ends. Batches of {end_stream} follow the offsets of {start_stream}",
                start.len(),
                end.len()
            );
        }

        let mut report = DriverReport::default();
        let mut offset = 0;
        while offset < start.len() {
            report.cycles += 1;

            log::info!("Sending start trip batch...");
            let outcome = self
                .publisher
                .publish(&slice_at(start, offset, size), start_stream)
                .await;
            report.start.add(&outcome);
            log::info!(
                "Sent {} start trips in this batch | {}",
                outcome.succeeded,
                timestamp_now()
            );

            sleep_between(self.options.min_pause(), self.options.max_pause()).await;

            log::info!("Sending end trip batch...");
            let outcome = self
                .publisher
                .publish(&slice_at(end, offset, size), end_stream)
                .await;
            report.end.add(&outcome);
            log::info!(
                "Sent {} end trips in this batch | {}",
                outcome.succeeded,
                timestamp_now()
            );

            offset += size.get();

            log::info!(
                "Completed batch cycle {}: {} start, {} end trips sent so far. Waiting before next batch...",
                report.cycles,
                report.start.succeeded,
                report.end.succeeded
            );
            sleep(self.options.cycle_pause()).await;
        }

        log::info!("Event simulation completed after {} cycles", report.cycles);
        report
    }
}
