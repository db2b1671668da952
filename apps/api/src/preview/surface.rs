use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::preview::tree::SurfaceDocument;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScrollOffset {
    pub x: u32,
    pub y: u32,
}

impl ScrollOffset {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Scroll is tracked on both the root element and the body, because which
/// one actually scrolls depends on the surface's document mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget {
    DocumentElement,
    Body,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Preview surface unreachable")]
    SurfaceUnreachable,

    #[error("Malformed document: {0}")]
    MalformedDocument(String),
}

/// An embedded sub-document the preview is rendered into.
///
/// `apply_in_place` swaps the live tree without re-running scripts;
/// `write` replaces the whole document and boots its scripts again.
/// Neither lays out synchronously: layout happens on `next_frame` or `ready`.
#[async_trait]
pub trait RenderSurface: Send {
    async fn current_document(&self) -> Result<SurfaceDocument, SyncError>;

    async fn apply_in_place(&mut self, document: SurfaceDocument) -> Result<(), SyncError>;

    async fn clear(&mut self) -> Result<(), SyncError>;

    async fn write(&mut self, html: &str) -> Result<(), SyncError>;

    async fn ready(&mut self) -> Result<(), SyncError>;

    async fn next_frame(&mut self);

    fn scroll_offset(&self, target: ScrollTarget) -> ScrollOffset;

    fn set_scroll_offset(&mut self, target: ScrollTarget, offset: ScrollOffset);
}
