// src/render/mod.rs
// =============================================================================
// This module turns a URL into a loaded page.
//
// The validator only cares about three things from a page load:
// - the HTML
// - the URL we ended up on
// - whether the renderer saw a navigation redirect
//
// That contract is the PageRenderer trait. The default implementation is a
// plain HTTP GET (see http.rs); a headless browser could implement the same
// trait without the validator noticing.
//
// The renderer is shared by every worker and created lazily, exactly once,
// through RenderBackend.
//
// Rust concepts:
// - Traits: A shared interface different types can implement
// - async-trait: Lets a trait with async methods be used as dyn PageRenderer
// - OnceCell: A value that is initialised at most once, even under races
// =============================================================================

mod http;

pub use http::{meta_refresh_target, HttpRenderer};

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::error::{InitError, PageLoadError};

/// A page as seen by the renderer. Consumed once by the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub html: String,
    /// Where we actually landed after following redirects.
    pub final_url: String,
    /// The renderer itself observed a navigation redirect.
    pub redirected: bool,
}

#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Loads `url`, pausing `delay` before each request.
    async fn render(&self, url: &str, delay: Duration) -> Result<FetchedPage, PageLoadError>;

    /// Releases whatever the renderer holds. Only RenderBackend::shutdown()
    /// calls it, at most once per renderer.
    async fn close(&self) {}
}

type RendererFactory<R> = Box<dyn Fn() -> Result<R, InitError> + Send + Sync>;

// Process-wide handle to the renderer.
//
// acquire() creates the renderer on first use. If many workers call it at
// the same moment only one of them runs the factory; the rest wait for it
// and get the same instance. shutdown() consumes the handle and is the only
// place close() runs. Dropping the handle without shutdown() drops the
// renderer value but never calls close() (Drop cannot await); it only logs.
pub struct RenderBackend<R> {
    cell: OnceCell<R>,
    factory: RendererFactory<R>,
}

impl<R: PageRenderer> RenderBackend<R> {
    pub fn new(factory: impl Fn() -> Result<R, InitError> + Send + Sync + 'static) -> Self {
        Self {
            cell: OnceCell::new(),
            factory: Box::new(factory),
        }
    }

    /// Returns the shared renderer, creating it if needed.
    pub async fn acquire(&self) -> Result<&R, InitError> {
        self.cell
            .get_or_try_init(|| async {
                let renderer = (self.factory)()?;
                info!("render backend started");
                Ok(renderer)
            })
            .await
    }

    pub fn is_started(&self) -> bool {
        self.cell.initialized()
    }

    /// Closes the renderer if it was ever started.
    pub async fn shutdown(mut self) {
        if let Some(renderer) = self.cell.take() {
            renderer.close().await;
            info!("render backend shut down");
        }
    }
}

impl<R> Drop for RenderBackend<R> {
    fn drop(&mut self) {
        if self.cell.initialized() {
            debug!("render backend dropped without explicit shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StaticRenderer;

    #[async_trait]
    impl PageRenderer for StaticRenderer {
        async fn render(&self, url: &str, _delay: Duration) -> Result<FetchedPage, PageLoadError> {
            Ok(FetchedPage {
                html: "<html></html>".to_string(),
                final_url: url.to_string(),
                redirected: false,
            })
        }
    }

    #[tokio::test]
    async fn test_backend_is_lazy() {
        let backend = RenderBackend::new(|| Ok(StaticRenderer));
        assert!(!backend.is_started());

        backend.acquire().await.unwrap();
        assert!(backend.is_started());
        backend.shutdown().await;
    }

    #[tokio::test]
    async fn test_concurrent_acquire_creates_once() {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&created);
        let backend = RenderBackend::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(StaticRenderer)
        });

        let acquisitions = (0..32).map(|_| backend.acquire());
        let results = futures::future::join_all(acquisitions).await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(created.load(Ordering::SeqCst), 1);
        backend.shutdown().await;
    }

    struct ClosingRenderer {
        closed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PageRenderer for ClosingRenderer {
        async fn render(&self, url: &str, delay: Duration) -> Result<FetchedPage, PageLoadError> {
            StaticRenderer.render(url, delay).await
        }

        async fn close(&self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn closing_backend(closed: &Arc<AtomicUsize>) -> RenderBackend<ClosingRenderer> {
        let closed = Arc::clone(closed);
        RenderBackend::new(move || {
            Ok(ClosingRenderer {
                closed: Arc::clone(&closed),
            })
        })
    }

    #[tokio::test]
    async fn test_only_shutdown_closes_renderer() {
        let closed = Arc::new(AtomicUsize::new(0));

        let dropped = closing_backend(&closed);
        dropped.acquire().await.unwrap();
        drop(dropped);
        assert_eq!(closed.load(Ordering::SeqCst), 0);

        let shut = closing_backend(&closed);
        shut.acquire().await.unwrap();
        shut.shutdown().await;
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_shutdown_of_unstarted_backend_skips_close() {
        let closed = Arc::new(AtomicUsize::new(0));
        closing_backend(&closed).shutdown().await;
        assert_eq!(closed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_init_is_reported() {
        let backend: RenderBackend<StaticRenderer> =
            RenderBackend::new(|| Err(InitError::InvalidConfig("no renderer".to_string())));

        assert!(backend.acquire().await.is_err());
        assert!(!backend.is_started());
    }
}
