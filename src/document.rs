//! The unit page document loaded from disk, and the renderer that serves
//! block views out of it.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, bail, eyre};
use serde::Deserialize;
use tracing::{debug, info};

use crate::block::BlockDescriptor;
use crate::editor::{BlockRenderer, RenderedBlock, STUDIO_VIEW};
use crate::page::Element;

/// A unit page: the unit itself, its element tree and the studio view of
/// each block on it, keyed by locator.
#[derive(Debug, Clone, Deserialize)]
pub struct PageDocument {
    pub unit: BlockDescriptor,
    pub root: Element,
    #[serde(default)]
    pub views: BTreeMap<String, Element>,
}

impl PageDocument {
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading page document from {}", path.display());
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read page document {}", path.display()))?;
        let document: Self = serde_json::from_str(&contents)
            .wrap_err_with(|| format!("Failed to parse page document {}", path.display()))?;
        info!(
            "Loaded unit {} with {} block views",
            document.unit,
            document.views.len()
        );
        Ok(document)
    }
}

/// Serves studio views from a loaded [`PageDocument`].
pub struct DocumentRenderer {
    views: BTreeMap<String, Element>,
}

impl DocumentRenderer {
    pub fn new(document: &PageDocument) -> Self {
        Self {
            views: document.views.clone(),
        }
    }
}

#[async_trait]
impl BlockRenderer for DocumentRenderer {
    async fn render(&self, descriptor: &BlockDescriptor, view: &str) -> Result<RenderedBlock> {
        if view != STUDIO_VIEW {
            bail!("Unsupported view {view:?} for {descriptor}");
        }
        let fragment = self
            .views
            .get(&descriptor.id)
            .cloned()
            .ok_or_else(|| eyre!("No {view} for block {}", descriptor.id))?;
        Ok(RenderedBlock { fragment })
    }
}
