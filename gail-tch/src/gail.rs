//! GAIL reward provider.
//!
//! GAIL (<https://arxiv.org/abs/1606.03476>) trains a [`Discriminator`] to tell
//! expert demonstrations from experiences of the agent, and rewards the agent for
//! experiences the discriminator takes for expert ones. With
//! [`GailConfig::use_vail`], the discriminator has the variational information
//! bottleneck of VAIL (<https://arxiv.org/abs/1810.00821>), see [`vail`].
//!
//! ```no_run
//! use gail_core::{ActionSpec, BehaviorSpec, RewardProvider};
//! use gail_tch::gail::{GailConfig, GailRewardProvider};
//! # fn main() -> anyhow::Result<()> {
//! let spec = BehaviorSpec::new(vec![vec![8]], ActionSpec::Continuous(2));
//! let config = GailConfig::default().demo_path("demos/expert.demo").use_vail(true);
//! let mut provider = GailRewardProvider::build(spec, config)?;
//! # let batch = gail_core::AgentBuffer::new();
//! let record = provider.update(&batch)?;
//! let rewards = provider.evaluate(&batch)?;
//! # Ok(())
//! # }
//! ```
mod base;
mod config;
mod discriminator;
pub mod vail;
pub use base::{reward_from_estimate, GailRewardProvider};
pub use config::GailConfig;
pub use discriminator::{Discriminator, DiscriminatorLoss};
