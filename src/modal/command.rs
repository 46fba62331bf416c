//! Background render of a block's editing view.
//!
//! The command reports through the modal's message channel instead of its
//! return value, so a failed render reaches the modal (and from there the
//! host) rather than only the command status line.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use color_eyre::eyre::eyre;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::block::BlockDescriptor;
use crate::commands::Command;
use crate::editor::BlockRenderer;
use crate::modal::message::ModalMsg;

/// Render one view of a block and deliver the result to the modal.
pub struct RenderBlockCmd {
    pub(super) renderer: Arc<dyn BlockRenderer>,
    pub(super) descriptor: BlockDescriptor,
    pub(super) view: &'static str,
    pub(super) generation: u64,
    pub(super) timeout: Option<Duration>,
    pub(super) tx: UnboundedSender<ModalMsg>,
}

#[async_trait]
impl Command for RenderBlockCmd {
    fn name(&self) -> String {
        format!("Loading {}", self.descriptor.label())
    }

    async fn execute(self: Box<Self>) -> color_eyre::Result<()> {
        let render = self.renderer.render(&self.descriptor, self.view);
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, render)
                .await
                .unwrap_or_else(|_| Err(eyre!("render timed out after {limit:?}"))),
            None => render.await,
        };

        let msg = match result {
            Ok(block) => ModalMsg::Rendered {
                generation: self.generation,
                block,
            },
            Err(e) => ModalMsg::RenderFailed {
                generation: self.generation,
                reason: format!("{e:#}"),
            },
        };
        debug!("Render of {} (generation {}) finished", self.descriptor.id, self.generation);
        // The modal may have been dropped while the render was in flight.
        let _ = self.tx.send(msg);
        Ok(())
    }
}
