//! Messages delivered to the edit-block modal by its background work.

use serde_json::{Map, Value};

use crate::block::BlockDescriptor;
use crate::editor::RenderedBlock;

/// Completion signals of a block render, tagged with the `open` they belong
/// to. The modal drops signals for any generation but the latest.
#[derive(Debug)]
pub enum ModalMsg {
    Rendered {
        generation: u64,
        block: RenderedBlock,
    },
    RenderFailed {
        generation: u64,
        reason: String,
    },
}

/// What the modal reports back to its host.
#[derive(Debug, Clone, PartialEq)]
pub enum ModalOutput {
    /// The user confirmed. `settings` holds the changed values only.
    Saved {
        descriptor: BlockDescriptor,
        settings: Map<String, Value>,
    },
    /// The user dismissed the modal.
    Cancelled,
    /// The block editor could not be rendered; the modal stays hidden.
    RenderFailed {
        descriptor: BlockDescriptor,
        reason: String,
    },
}
