//! Types for reporting training statistics.
//!
//! * [`Record`] - a container of key-value pairs
//! * [`RecordValue`] - the types of values that can be stored
//!
//! ```rust
//! use gail_core::record::{Record, RecordValue};
//!
//! let mut record = Record::default();
//! record.insert("Policy/GAIL Policy Estimate", RecordValue::Scalar(0.5));
//! assert!(!record.is_empty());
//! ```
mod base;

pub use base::{Record, RecordValue};
