//! In-memory render surface.
//!
//! Layout is approximated from visible body text: fixed characters per line,
//! fixed line height, no horizontal overflow. That is enough to make scroll
//! clamping behave like a real embedded document when content shrinks or
//! has not been laid out yet.

use async_trait::async_trait;
use tracing::debug;

use crate::preview::surface::{RenderSurface, ScrollOffset, ScrollTarget, SyncError};
use crate::preview::tree::SurfaceDocument;

pub const CHARS_PER_LINE: usize = 80;
pub const LINE_HEIGHT_PX: u32 = 20;
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 600;

#[derive(Debug)]
pub struct HeadlessSurface {
    document: SurfaceDocument,
    attached: bool,
    viewport_height: u32,
    content_height: u32,
    root_scroll: ScrollOffset,
    body_scroll: ScrollOffset,
    script_boots: usize,
    reloads: usize,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::with_viewport(DEFAULT_VIEWPORT_HEIGHT)
    }

    pub fn with_viewport(viewport_height: u32) -> Self {
        Self {
            document: SurfaceDocument::default(),
            attached: true,
            viewport_height,
            content_height: 0,
            root_scroll: ScrollOffset::default(),
            body_scroll: ScrollOffset::default(),
            script_boots: 0,
            reloads: 0,
        }
    }

    pub fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    pub fn content_height(&self) -> u32 {
        self.content_height
    }

    /// Current document serialized back to HTML.
    pub fn html(&self) -> String {
        self.document.to_html()
    }

    /// Scripts started by full writes since creation.
    pub fn script_boots(&self) -> usize {
        self.script_boots
    }

    pub fn reloads(&self) -> usize {
        self.reloads
    }

    /// Makes the live tree unreachable until the next `clear`.
    #[cfg(test)]
    pub fn detach(&mut self) {
        self.attached = false;
    }

    fn ensure_attached(&self) -> Result<(), SyncError> {
        if self.attached {
            Ok(())
        } else {
            Err(SyncError::SurfaceUnreachable)
        }
    }

    /// Content replaced: nothing is laid out yet, so scroll collapses to 0.
    fn invalidate_layout(&mut self) {
        self.content_height = 0;
        self.root_scroll = ScrollOffset::default();
        self.body_scroll = ScrollOffset::default();
    }

    fn layout(&mut self) {
        let lines = self.document.body_text_len().div_ceil(CHARS_PER_LINE);
        self.content_height = u32::try_from(lines)
            .unwrap_or(u32::MAX)
            .saturating_mul(LINE_HEIGHT_PX);
    }

    fn max_scroll_y(&self) -> u32 {
        self.content_height.saturating_sub(self.viewport_height)
    }
}

#[async_trait]
impl RenderSurface for HeadlessSurface {
    async fn current_document(&self) -> Result<SurfaceDocument, SyncError> {
        self.ensure_attached()?;
        Ok(self.document.clone())
    }

    async fn apply_in_place(&mut self, document: SurfaceDocument) -> Result<(), SyncError> {
        self.ensure_attached()?;
        self.document = document;
        self.invalidate_layout();
        Ok(())
    }

    async fn clear(&mut self) -> Result<(), SyncError> {
        self.document = SurfaceDocument::default();
        self.attached = true;
        self.reloads += 1;
        self.invalidate_layout();
        Ok(())
    }

    async fn write(&mut self, html: &str) -> Result<(), SyncError> {
        self.ensure_attached()?;
        self.document = SurfaceDocument::parse(html).unwrap_or_else(|_| SurfaceDocument {
            body: html.to_string(),
            ..Default::default()
        });
        self.script_boots += self.document.scripts();
        self.invalidate_layout();
        debug!(scripts = self.document.scripts(), "Surface document written");
        Ok(())
    }

    async fn ready(&mut self) -> Result<(), SyncError> {
        self.ensure_attached()?;
        tokio::task::yield_now().await;
        self.layout();
        Ok(())
    }

    async fn next_frame(&mut self) {
        tokio::task::yield_now().await;
        self.layout();
    }

    fn scroll_offset(&self, target: ScrollTarget) -> ScrollOffset {
        match target {
            ScrollTarget::DocumentElement => self.root_scroll,
            ScrollTarget::Body => self.body_scroll,
        }
    }

    fn set_scroll_offset(&mut self, target: ScrollTarget, offset: ScrollOffset) {
        let clamped = ScrollOffset::new(0, offset.y.min(self.max_scroll_y()));
        match target {
            ScrollTarget::DocumentElement => self.root_scroll = clamped,
            ScrollTarget::Body => self.body_scroll = clamped,
        }
    }
}
