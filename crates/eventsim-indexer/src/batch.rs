// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Batching buffer for documents.
//!
//! Accumulates documents up to a fixed capacity. The owner checks
//! [`Batch::is_full`] after every append and flushes before appending again;
//! at end of input the partial batch is flushed with
//! [`Batch::flush_if_non_empty`].

use crate::document::Document;
use crate::transport::{DeliveryError, PipelineTransport};

/// A bounded, ordered batch of documents owned by one partition.
pub struct Batch {
    documents: Vec<Document>,
    capacity: usize,
}

impl Batch {
    /// Create a new empty batch.
    ///
    /// # Arguments
    /// - `capacity` - Number of documents that makes the batch full
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "batch capacity must be positive");
        Self {
            documents: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a document.
    ///
    /// The batch must not be full.
    pub fn append(&mut self, document: Document) {
        debug_assert!(!self.is_full(), "append to a full batch");
        self.documents.push(document);
    }

    /// Check if the batch reached its capacity.
    pub fn is_full(&self) -> bool {
        self.documents.len() >= self.capacity
    }

    /// Post the batch through `transport`, then clear it.
    ///
    /// On failure the documents stay in the batch and the error is returned.
    /// Returns the number of documents delivered.
    pub fn flush<T>(&mut self, transport: &mut T) -> Result<usize, DeliveryError>
    where
        T: PipelineTransport + ?Sized,
    {
        transport.post_batch(&self.documents)?;
        let sent = self.documents.len();
        self.documents.clear();
        Ok(sent)
    }

    /// Flush only if at least one document is buffered.
    ///
    /// Returns the number of documents delivered (0 if nothing was sent).
    pub fn flush_if_non_empty<T>(&mut self, transport: &mut T) -> Result<usize, DeliveryError>
    where
        T: PipelineTransport + ?Sized,
    {
        if self.is_empty() {
            return Ok(0);
        }
        self.flush(transport)
    }

    /// Get the current number of buffered documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Buffered documents, in append order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }
}
