//! The edit-block modal: an overlay embedding a block's editor and, for
//! blocks that carry one, its settings form.

mod command;
mod edit_block;
mod message;
mod state;

pub use edit_block::{EditBlockModal, ModalVariant};
pub use message::ModalOutput;
