//! Experience buffers.
//!
//! An [`AgentBuffer`] holds experiences as named [`Column`]s. The reward
//! providers in this workspace read the columns
//! [`VECTOR_OBS`], `visual_obs{i}`, [`ACTIONS`] and [`DONE`].
mod base;
mod column;
pub use base::{AgentBuffer, ACTIONS, DONE, VECTOR_OBS};
pub use column::Column;
