#![warn(missing_docs)]
//! Core types for adversarial imitation learning rewards.
//!
//! This crate does not depend on any tensor library. It provides
//!
//! * [`AgentBuffer`], the columnar experience buffer shared by live policy
//!   batches and expert demonstrations,
//! * [`BehaviorSpec`], the observation and action spaces of a behavior,
//! * [`demo`], reading and writing demonstration files,
//! * [`record`], named training statistics,
//! * [`RewardProvider`], the interface implemented by reward signals.
pub mod behavior;
pub mod buffer;
pub mod demo;
pub mod error;
pub mod record;
mod reward_provider;

pub use behavior::{ActionSpec, BehaviorSpec};
pub use buffer::{AgentBuffer, Column};
pub use demo::{demo_to_buffer, Demonstration};
pub use error::GailError;
pub use reward_provider::RewardProvider;
