// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Delivery seam between the partition pipeline and the indexing endpoint.

use crate::document::Document;
use thiserror::Error;

/// Failure to deliver a batch. Never retried by the pipeline itself.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("HTTP request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} rejected batch with status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("authentication against {endpoint} failed: {reason}")]
    Auth { endpoint: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid endpoint URL {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("failed to encode batch: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("no indexing endpoints configured")]
    NoEndpoints,

    #[error("delivery failed: {0}")]
    Other(String),
}

impl DeliveryError {
    /// Whether another endpoint may succeed where this one failed.
    pub fn is_failover(&self) -> bool {
        match self {
            DeliveryError::Http { .. } => true,
            DeliveryError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Posts batches of documents to an indexing pipeline.
///
/// One instance is owned by exactly one partition; implementations do not
/// need to be `Sync`.
pub trait PipelineTransport {
    /// Deliver a batch, blocking until it is acknowledged or fails.
    fn post_batch(&mut self, documents: &[Document]) -> Result<(), DeliveryError>;
}

impl<T: PipelineTransport + ?Sized> PipelineTransport for Box<T> {
    fn post_batch(&mut self, documents: &[Document]) -> Result<(), DeliveryError> {
        (**self).post_batch(documents)
    }
}

/// Creates one transport per partition.
///
/// Shared by reference across partition threads.
pub trait TransportFactory: Sync {
    /// Transport type handed to each partition.
    type Transport: PipelineTransport;

    /// Acquire a transport for partition `partition`.
    fn connect(&self, partition: usize) -> Result<Self::Transport, DeliveryError>;
}
