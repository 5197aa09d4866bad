//! K2List - merge block-list files into one deduplicated list.
//!
//! This crate reads every list file under a directory tree, classifies each
//! entry as a network (IP address or CIDR range) or an opaque domain string,
//! and reduces the networks to a minimal covering set.
//!
//! # Pipeline
//!
//! 1. [`Collector`] walks the root directory and gathers unique raw entries
//!    (trimmed, without blank lines and `#` comments).
//! 2. [`deduplicate`] classifies entries and drops every network that is
//!    contained in another one. Domains are deduplicated by exact string.
//! 3. [`ListWriter`] writes the result sorted, one entry per line.
//!
//! # Quick Start
//!
//! ```no_run
//! use k2list::{deduplicate, Collector, ListWriter};
//! use std::path::Path;
//!
//! let entries = Collector::new("list").collect(Path::new("lists"))?;
//! let merged = deduplicate(&entries);
//! ListWriter::new("full.list").write(&merged)?;
//! # Ok::<(), k2list::Error>(())
//! ```
//!
//! # Classification
//!
//! - `10.0.0.5/24` -> network `10.0.0.0/24` (host bits masked)
//! - `192.168.1.1` -> network `192.168.1.1/32`
//! - `10.0.0.0/255.0.0.0` -> network `10.0.0.0/8`
//! - `example.com`, `not-an-ip!!` -> domain, kept verbatim

mod error;

pub mod collector;
pub mod config;
pub mod dedup;
pub mod entry;
pub mod writer;

// Re-export core types
pub use error::{Error, Result};

pub use collector::Collector;
pub use config::MergeConfig;
pub use dedup::{deduplicate, minimize, MergeStats, MergedList};
pub use entry::{classify, parse_network, Entry};
pub use writer::ListWriter;
