//! Sinew Runtime - Frame loop infrastructure
//!
//! Provides the building blocks a host loop needs to drive the animation runtime:
//! - `FrameClock`: step-driven clock with a fixed-timestep accumulator
//! - `RuntimeSystem`: trait for systems ticked once per frame

mod clock;
mod system;

pub use clock::FrameClock;
pub use system::RuntimeSystem;
