// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Eventsim Indexer
//!
//! Turns eventsim user-activity rows into indexing pipeline documents and
//! posts them in batches over HTTP, one transport per partition.
//!
//! This crate provides:
//! - JSON-lines loading with schema inference and partitioning
//! - Row-to-document mapping with deterministic `userId-sessionId-ts` ids
//! - ISO-8601 UTC normalization of the `ts` field
//! - Size-bounded batching with a mandatory final flush
//! - A blocking HTTP pipeline client with session authentication
//!
//! # Overview
//!
//! ```text
//! Partition --> PartitionDriver --> DocumentMapper --> Batch --> PipelineTransport --> endpoint
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use eventsim_indexer::{HttpTransportFactory, JsonLinesSource, PartitionRunner, PipelineConfig};
//!
//! let config = PipelineConfig::from_file("indexer.toml")?;
//! let source = JsonLinesSource::from_path("eventsim.json")?;
//! let partitions = source.partitions(4);
//!
//! let stats = PartitionRunner::new(&config).run(&partitions, &HttpTransportFactory::new(&config))?;
//! println!("indexed {} documents", stats.totals.documents_posted);
//! ```

pub mod batch;
pub mod client;
pub mod config;
pub mod document;
pub mod driver;
pub mod error;
pub mod mapper;
pub mod mock;
pub mod record;
pub mod runner;
pub mod source;
pub mod timestamp;
pub mod transport;

pub use batch::Batch;
pub use client::{HttpTransportFactory, PipelineClient};
pub use config::{ConfigError, PipelineConfig};
pub use document::{Document, Field};
pub use driver::{PartitionDriver, PartitionState, PartitionStats};
pub use error::IndexerError;
pub use mapper::{DocumentMapper, ReservedField};
pub use mock::MemoryFactory;
pub use record::{Record, Schema, Value};
pub use runner::{CancellationToken, JobStats, PartitionRunner};
pub use source::{JsonLinesSource, SourceError};
pub use timestamp::iso8601_utc;
pub use transport::{DeliveryError, PipelineTransport, TransportFactory};
