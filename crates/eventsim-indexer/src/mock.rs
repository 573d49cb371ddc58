// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-memory transport for dry runs and tests.
//!
//! Every posted batch is recorded with its partition index instead of being
//! sent over the network. A failure can be injected at a given post.

use crate::document::Document;
use crate::transport::{DeliveryError, PipelineTransport, TransportFactory};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A batch as received by the in-memory transport.
#[derive(Debug, Clone, PartialEq)]
pub struct PostedBatch {
    /// Partition that posted the batch.
    pub partition: usize,
    /// Documents in post order.
    pub documents: Vec<Document>,
}

#[derive(Debug, Default)]
struct Shared {
    posted: Mutex<Vec<PostedBatch>>,
    connections: AtomicUsize,
}

/// Factory handing out [`MemoryTransport`]s that share one log.
#[derive(Debug, Clone, Default)]
pub struct MemoryFactory {
    shared: Arc<Shared>,
    fail_at: Option<usize>,
}

impl MemoryFactory {
    /// Create a factory whose transports accept every batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a factory whose transports fail their `n`-th post (0-based).
    pub fn failing_at(n: usize) -> Self {
        Self {
            fail_at: Some(n),
            ..Self::default()
        }
    }

    /// All batches posted so far, across partitions.
    pub fn posted(&self) -> Vec<PostedBatch> {
        self.lock().clone()
    }

    /// Sizes of posted batches, in post order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.lock().iter().map(|b| b.documents.len()).collect()
    }

    /// Ids of posted documents, in post order.
    pub fn posted_ids(&self) -> Vec<String> {
        self.lock()
            .iter()
            .flat_map(|b| b.documents.iter().map(|d| d.id.clone()))
            .collect()
    }

    /// Number of transports handed out.
    pub fn connections(&self) -> usize {
        self.shared.connections.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PostedBatch>> {
        self.shared
            .posted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl TransportFactory for MemoryFactory {
    type Transport = MemoryTransport;

    fn connect(&self, partition: usize) -> Result<MemoryTransport, DeliveryError> {
        self.shared.connections.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryTransport {
            partition,
            shared: Arc::clone(&self.shared),
            fail_at: self.fail_at,
            posts: 0,
        })
    }
}

/// Transport recording batches in memory.
#[derive(Debug)]
pub struct MemoryTransport {
    partition: usize,
    shared: Arc<Shared>,
    fail_at: Option<usize>,
    posts: usize,
}

impl PipelineTransport for MemoryTransport {
    fn post_batch(&mut self, documents: &[Document]) -> Result<(), DeliveryError> {
        let n = self.posts;
        self.posts += 1;
        if self.fail_at == Some(n) {
            return Err(DeliveryError::Other(format!(
                "injected failure on post {} of partition {}",
                n, self.partition
            )));
        }

        self.shared
            .posted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(PostedBatch {
                partition: self.partition,
                documents: documents.to_vec(),
            });
        Ok(())
    }
}
