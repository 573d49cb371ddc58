// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Crate-level error type.

use crate::config::ConfigError;
use crate::source::SourceError;
use crate::transport::DeliveryError;
use thiserror::Error;

/// Errors that abort an indexing run.
#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to load events: {0}")]
    Source(#[from] SourceError),

    #[error("partition {partition} failed")]
    Partition {
        partition: usize,
        #[source]
        source: DeliveryError,
    },

    #[error("partition {0} worker panicked")]
    Panicked(usize),
}

/// Result alias for indexing runs.
pub type Result<T> = std::result::Result<T, IndexerError>;
