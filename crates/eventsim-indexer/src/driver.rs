// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-partition pipeline driver.
//!
//! Connects the mapper, the batch and one transport for a single partition:
//!
//! ```text
//! Init -> Streaming -> (Flushing -> Streaming)* -> Draining -> Done
//! ```
//!
//! A delivery fault while flushing or draining ends the partition in
//! `Failed`; batches posted before the fault stay delivered.

use crate::batch::Batch;
use crate::config::PipelineConfig;
use crate::mapper::DocumentMapper;
use crate::record::Record;
use crate::transport::{DeliveryError, TransportFactory};
use std::borrow::Borrow;
use std::ops::AddAssign;

/// Lifecycle of one partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionState {
    /// Not started.
    Init,
    /// Mapping rows into the batch.
    Streaming,
    /// Posting a full batch.
    Flushing,
    /// Input exhausted, posting the final partial batch.
    Draining,
    /// All documents delivered.
    Done,
    /// A delivery fault aborted the partition.
    Failed,
}

/// Counters for one partition (or a whole job, when summed).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartitionStats {
    /// Rows pulled from the input.
    pub rows_read: u64,
    /// Rows skipped for lacking identity fields or usable values.
    pub rows_skipped: u64,
    /// Batches acknowledged by the transport.
    pub batches_posted: u64,
    /// Documents acknowledged by the transport.
    pub documents_posted: u64,
}

impl AddAssign for PartitionStats {
    fn add_assign(&mut self, other: Self) {
        self.rows_read += other.rows_read;
        self.rows_skipped += other.rows_skipped;
        self.batches_posted += other.batches_posted;
        self.documents_posted += other.documents_posted;
    }
}

/// Drives one partition's rows through mapping, batching and delivery.
pub struct PartitionDriver<'a, F: TransportFactory> {
    partition: usize,
    batch_size: usize,
    factory: &'a F,
    mapper: DocumentMapper,
    state: PartitionState,
}

impl<'a, F: TransportFactory> PartitionDriver<'a, F> {
    /// Create a driver for partition `partition`.
    ///
    /// A zero `batch_size` (only possible on a config that skipped
    /// [`PipelineConfig::validate`]) is treated as 1.
    pub fn new(partition: usize, config: &PipelineConfig, factory: &'a F) -> Self {
        Self {
            partition,
            batch_size: config.batch_size.max(1),
            factory,
            mapper: DocumentMapper::new(),
            state: PartitionState::Init,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PartitionState {
        self.state
    }

    /// Process every record, then flush the remaining partial batch.
    ///
    /// Acquires exactly one transport, released when this returns.
    pub fn run<I>(&mut self, records: I) -> Result<PartitionStats, DeliveryError>
    where
        I: IntoIterator,
        I::Item: Borrow<Record>,
    {
        let result = self.stream(records);
        self.transition(if result.is_ok() {
            PartitionState::Done
        } else {
            PartitionState::Failed
        });
        result
    }

    fn stream<I>(&mut self, records: I) -> Result<PartitionStats, DeliveryError>
    where
        I: IntoIterator,
        I::Item: Borrow<Record>,
    {
        let mut transport = self.factory.connect(self.partition)?;
        let mut batch = Batch::new(self.batch_size);
        let mut stats = PartitionStats::default();

        self.transition(PartitionState::Streaming);
        for record in records {
            stats.rows_read += 1;

            let Some(document) = self.mapper.map(record.borrow()) else {
                stats.rows_skipped += 1;
                continue;
            };

            batch.append(document);
            if batch.is_full() {
                self.transition(PartitionState::Flushing);
                let sent = self.flush(&mut batch, &mut transport, false)?;
                stats.batches_posted += 1;
                stats.documents_posted += sent as u64;
                self.transition(PartitionState::Streaming);
            }
        }

        self.transition(PartitionState::Draining);
        if !batch.is_empty() {
            let sent = self.flush(&mut batch, &mut transport, true)?;
            stats.batches_posted += 1;
            stats.documents_posted += sent as u64;
        }

        Ok(stats)
    }

    fn flush(
        &self,
        batch: &mut Batch,
        transport: &mut F::Transport,
        last: bool,
    ) -> Result<usize, DeliveryError> {
        tracing::trace!(
            "partition {}: flushing {} documents{}",
            self.partition,
            batch.len(),
            if last { " (final)" } else { "" }
        );
        batch.flush(transport).map_err(|e| {
            tracing::warn!(
                "partition {}: failed to deliver {} documents: {}",
                self.partition,
                batch.len(),
                e
            );
            e
        })
    }

    fn transition(&mut self, next: PartitionState) {
        tracing::trace!("partition {}: {:?} -> {:?}", self.partition, self.state, next);
        self.state = next;
    }
}

/// Run one partition with a fresh driver.
pub fn process_partition<F, I>(
    partition: usize,
    records: I,
    config: &PipelineConfig,
    factory: &F,
) -> Result<PartitionStats, DeliveryError>
where
    F: TransportFactory,
    I: IntoIterator,
    I::Item: Borrow<Record>,
{
    PartitionDriver::new(partition, config, factory).run(records)
}
