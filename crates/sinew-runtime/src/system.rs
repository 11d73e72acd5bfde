//! Runtime system trait

use sinew_core::Result;

/// A system that can be ticked by the frame loop
///
/// Systems are updated in registration order, once per frame, with the
/// elapsed frame time in milliseconds.
pub trait RuntimeSystem {
    /// Called once when the system is first registered
    fn initialize(&mut self) -> Result<()>;

    /// Called once per frame
    fn update(&mut self, delta_ms: f32) -> Result<()>;

    /// Called when the system is being shut down
    fn shutdown(&mut self) -> Result<()>;

    /// Human-readable name for this system
    fn name(&self) -> &str;
}
