// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Parallel partition execution.
//!
//! Runs one [`PartitionDriver`](crate::driver::PartitionDriver) per
//! partition on its own thread. The job fails if any partition fails.
//! Cancellation stops feeding rows between records; every partition still
//! flushes its partial batch.

use crate::config::PipelineConfig;
use crate::driver::{process_partition, PartitionStats};
use crate::error::{IndexerError, Result};
use crate::record::Record;
use crate::transport::TransportFactory;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared flag to stop feeding rows to running partitions.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Outcome of a successful job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobStats {
    /// Partitions processed.
    pub partitions: usize,
    /// Counters summed over all partitions.
    pub totals: PartitionStats,
    /// Whether the job was cancelled before the input was exhausted.
    pub cancelled: bool,
}

/// Executes partitions in parallel against shared configuration.
pub struct PartitionRunner<'a> {
    config: &'a PipelineConfig,
    cancel: CancellationToken,
}

impl<'a> PartitionRunner<'a> {
    /// Create a runner over validated configuration.
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally controlled cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels this runner.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Process every partition, one thread each.
    ///
    /// Returns the summed stats, or the error of the lowest-numbered
    /// partition that failed.
    pub fn run<F: TransportFactory>(
        &self,
        partitions: &[&[Record]],
        factory: &F,
    ) -> Result<JobStats> {
        let started = Instant::now();
        tracing::debug!("starting {} partitions", partitions.len());

        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = partitions
                .iter()
                .enumerate()
                .map(|(idx, rows)| {
                    let cancel = self.cancel.clone();
                    let config = self.config;
                    scope.spawn(move || {
                        process_partition(idx, until_cancelled(*rows, &cancel), config, factory)
                    })
                })
                .collect();

            handles
                .into_iter()
                .enumerate()
                .map(|(idx, handle)| (idx, handle.join()))
                .collect()
        });

        let mut stats = JobStats {
            partitions: partitions.len(),
            ..Default::default()
        };
        let mut first_error = None;

        for (idx, result) in results {
            match result {
                Ok(Ok(partition_stats)) => {
                    tracing::debug!(
                        "partition {}: {} rows, {} skipped, {} documents in {} batches",
                        idx,
                        partition_stats.rows_read,
                        partition_stats.rows_skipped,
                        partition_stats.documents_posted,
                        partition_stats.batches_posted
                    );
                    stats.totals += partition_stats;
                }
                Ok(Err(e)) => {
                    tracing::error!("partition {} failed: {}", idx, e);
                    first_error.get_or_insert(IndexerError::Partition {
                        partition: idx,
                        source: e,
                    });
                }
                Err(_) => {
                    tracing::error!("partition {} worker panicked", idx);
                    first_error.get_or_insert(IndexerError::Panicked(idx));
                }
            }
        }

        if let Some(err) = first_error {
            return Err(err);
        }

        stats.cancelled = self.cancel.is_cancelled();
        log_summary(&stats, started.elapsed());
        Ok(stats)
    }
}

/// Yield rows until `cancel` is set. The check runs before each row is
/// handed out, so a row already being processed always completes.
fn until_cancelled<'t, I>(
    rows: I,
    cancel: &'t CancellationToken,
) -> impl Iterator<Item = I::Item> + 't
where
    I: IntoIterator,
    I::IntoIter: 't,
{
    rows.into_iter().take_while(move |_| !cancel.is_cancelled())
}

fn log_summary(stats: &JobStats, elapsed: Duration) {
    let secs = elapsed.as_secs_f64();
    let rate = if secs > 0.0 {
        stats.totals.documents_posted as f64 / secs
    } else {
        0.0
    };
    tracing::info!(
        "indexed {} documents from {} rows ({} skipped) in {} batches across {} partitions, {:.1}s ({:.0} docs/s){}",
        stats.totals.documents_posted,
        stats.totals.rows_read,
        stats.totals.rows_skipped,
        stats.totals.batches_posted,
        stats.partitions,
        secs,
        rate,
        if stats.cancelled { " [cancelled]" } else { "" }
    );
}
