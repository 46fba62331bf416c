//! Async commands pattern for side effects.
//!
//! Commands represent async operations that run outside the main event loop.
//! Components return commands, and the App spawns them. Results travel back
//! to the component that issued the command through its own channel.

use async_trait::async_trait;
use color_eyre::Result;

/// Async command that performs a side effect.
#[async_trait]
pub trait Command: Send + 'static {
    /// Human-readable name for logs and error messages.
    fn name(&self) -> String;

    /// Execute the command.
    async fn execute(self: Box<Self>) -> Result<()>;
}
