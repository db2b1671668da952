//! Scroll-preserving preview refresh.
//!
//! Preferred path patches the live tree in place: body swapped, head style
//! nodes swapped, scripts untouched. Any failure there falls back to a full
//! reload. Both paths restore scroll only after the next frame, once the new
//! content has been laid out and the saved offset is reachable again.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::preview::surface::{RenderSurface, ScrollOffset, ScrollTarget, SyncError};
use crate::preview::tree::SurfaceDocument;
use crate::templates::sanitize::strip_provenance_markers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPath {
    InPlace,
    FullReload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub path: SyncPath,
    pub saved: ScrollOffset,
    pub restored: ScrollOffset,
}

pub struct PreviewSynchronizer<S: RenderSurface> {
    surface: S,
    syncs: u64,
}

impl<S: RenderSurface> PreviewSynchronizer<S> {
    pub fn new(surface: S) -> Self {
        Self { surface, syncs: 0 }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Completed syncs, either path.
    pub fn syncs(&self) -> u64 {
        self.syncs
    }

    /// Renders `new_html` into the surface. `&mut self` serializes calls.
    pub async fn sync(&mut self, new_html: &str) -> Result<SyncReport, SyncError> {
        let html = strip_provenance_markers(new_html);
        let saved = self.saved_scroll();

        let path = match self.patch_in_place(&html).await {
            Ok(()) => SyncPath::InPlace,
            Err(e) => {
                warn!(error = %e, "In-place preview patch failed, falling back to full reload");
                self.full_reload(&html).await?;
                SyncPath::FullReload
            }
        };

        self.surface.next_frame().await;
        self.restore_scroll(saved);
        let restored = self.surface.scroll_offset(ScrollTarget::DocumentElement);

        self.syncs += 1;
        if restored != saved {
            info!(?saved, ?restored, "Preview scroll clamped to new content height");
        }
        debug!(?path, ?restored, syncs = self.syncs, "Preview synced");

        Ok(SyncReport {
            path,
            saved,
            restored,
        })
    }

    /// Whichever of root element and body is actually scrolled.
    fn saved_scroll(&self) -> ScrollOffset {
        let root = self.surface.scroll_offset(ScrollTarget::DocumentElement);
        let body = self.surface.scroll_offset(ScrollTarget::Body);
        ScrollOffset::new(root.x.max(body.x), root.y.max(body.y))
    }

    fn restore_scroll(&mut self, offset: ScrollOffset) {
        self.surface
            .set_scroll_offset(ScrollTarget::DocumentElement, offset);
        self.surface.set_scroll_offset(ScrollTarget::Body, offset);
    }

    async fn patch_in_place(&mut self, html: &str) -> Result<(), SyncError> {
        let incoming = SurfaceDocument::parse(html)?;
        let mut current = self.surface.current_document().await?;
        let stats = current.patch_from(&incoming);
        debug!(
            styles_replaced = stats.styles_replaced,
            head_nodes_kept = stats.head_nodes_kept,
            "Patched preview tree"
        );
        self.surface.apply_in_place(current).await
    }

    async fn full_reload(&mut self, html: &str) -> Result<(), SyncError> {
        self.surface.clear().await?;
        self.surface.ready().await?;
        self.surface.write(html).await?;
        self.surface.ready().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::headless::{HeadlessSurface, CHARS_PER_LINE, LINE_HEIGHT_PX};

    /// Complete document whose body lays out to `lines` lines.
    fn page(lines: usize, marker: &str) -> String {
        let text = "x".repeat(lines * CHARS_PER_LINE);
        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<script src=\"/boot.js\"></script>\n<style>body {{ margin: 0; }}</style>\n</head>\n<body>\n<h1>{marker}</h1>\n<p>{text}</p>\n</body>\n</html>\n"
        )
    }

    /// Surface showing a document three viewports tall, scrolled to (0, 400).
    async fn scrolled_surface() -> HeadlessSurface {
        let mut surface = HeadlessSurface::new();
        let lines = three_viewports(&surface);
        surface.write(&page(lines, "v1")).await.unwrap();
        surface.ready().await.unwrap();
        surface.set_scroll_offset(ScrollTarget::DocumentElement, ScrollOffset::new(0, 400));
        surface.set_scroll_offset(ScrollTarget::Body, ScrollOffset::new(0, 400));
        surface
    }

    fn three_viewports(surface: &HeadlessSurface) -> usize {
        3 * (surface.viewport_height() / LINE_HEIGHT_PX) as usize
    }

    #[tokio::test]
    async fn test_in_place_restores_scroll() {
        let surface = scrolled_surface().await;
        let lines = three_viewports(&surface);
        let mut sync = PreviewSynchronizer::new(surface);

        let report = sync.sync(&page(lines, "v2")).await.unwrap();

        assert_eq!(report.path, SyncPath::InPlace);
        assert_eq!(report.restored, ScrollOffset::new(0, 400));
        assert_eq!(
            sync.surface().scroll_offset(ScrollTarget::Body),
            ScrollOffset::new(0, 400)
        );
        assert!(sync.surface().html().contains("v2"));
        assert_eq!(sync.surface().script_boots(), 1, "scripts must not re-run in place");
        assert_eq!(sync.syncs(), 1);
    }

    #[tokio::test]
    async fn test_full_reload_restores_scroll() {
        let mut surface = scrolled_surface().await;
        let lines = three_viewports(&surface);
        surface.detach();
        let mut sync = PreviewSynchronizer::new(surface);

        let report = sync.sync(&page(lines, "v2")).await.unwrap();

        assert_eq!(report.path, SyncPath::FullReload);
        assert_eq!(report.restored, ScrollOffset::new(0, 400));
        assert_eq!(
            sync.surface().scroll_offset(ScrollTarget::Body),
            ScrollOffset::new(0, 400)
        );
        assert_eq!(sync.surface().reloads(), 1);
        assert!(sync.surface().html().contains("v2"));
    }

    #[tokio::test]
    async fn test_tripled_content_keeps_scroll_on_both_paths() {
        for detached in [false, true] {
            let mut surface = scrolled_surface().await;
            let lines = three_viewports(&surface);
            if detached {
                surface.detach();
            }
            let mut sync = PreviewSynchronizer::new(surface);

            let report = sync.sync(&page(3 * lines, "long")).await.unwrap();

            let expected = if detached { SyncPath::FullReload } else { SyncPath::InPlace };
            assert_eq!(report.path, expected);
            assert_eq!(report.saved, ScrollOffset::new(0, 400));
            assert_eq!(report.restored, ScrollOffset::new(0, 400));
            assert_eq!(
                sync.surface().scroll_offset(ScrollTarget::Body),
                ScrollOffset::new(0, 400)
            );
            assert!(sync.surface().html().contains("long"));
        }
    }

    #[tokio::test]
    async fn test_markers_stripped_before_render() {
        let mut sync = PreviewSynchronizer::new(HeadlessSurface::new());
        let html = "<html><head></head><body><p><span class=\"ai-added\">generated</span></p></body></html>";

        sync.sync(html).await.unwrap();

        let rendered = sync.surface().html();
        assert!(rendered.contains("<p>generated</p>"));
        assert!(!rendered.contains("ai-added"));
    }

    #[tokio::test]
    async fn test_shorter_content_clamps_scroll() {
        let surface = scrolled_surface().await;
        let mut sync = PreviewSynchronizer::new(surface);

        let report = sync.sync(&page(1, "short")).await.unwrap();

        assert_eq!(report.saved, ScrollOffset::new(0, 400));
        assert_eq!(report.restored, ScrollOffset::new(0, 0));
    }
}
