//! Debounced, cancel-superseded rendering for interactive callers.
//!
//! Every submission takes a generation ticket. A render whose ticket is no
//! longer the newest when it wakes up is abandoned and reported as `None`;
//! only the latest request ever yields a raster. Nothing is shared between
//! renders except the counter, so an abandoned render cannot disturb a newer
//! one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use image::RgbaImage;
use tokio::task::{self, JoinError};

use crate::compose::logo::decode_logo;
use crate::config::QrConfig;
use crate::error::Result;
use crate::pipeline;
use crate::raster::RasterImage;

/// Delay before a submission starts rendering.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Clone, Debug)]
pub struct RenderScheduler {
    generation: Arc<AtomicU64>,
    debounce: Duration,
}

impl Default for RenderScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl RenderScheduler {
    pub fn new(debounce: Duration) -> Self {
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            debounce,
        }
    }

    /// Ticket of the newest submission so far.
    pub fn latest(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn superseded(&self, ticket: u64) -> bool {
        self.latest() != ticket
    }

    /// Marks every in-flight render as superseded.
    pub fn cancel_all(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Renders `config` unless a newer submission arrives first.
    ///
    /// Returns `Ok(None)` when this render was superseded at any suspension
    /// point (the debounce wait, the logo decode, or the render itself),
    /// even if the superseded work failed.
    ///
    /// # Errors
    ///
    /// Encoding and render failures of the latest submission.
    pub async fn submit(&self, config: QrConfig) -> Result<Option<RasterImage>> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if !self.debounce.is_zero() {
            tokio::time::sleep(self.debounce).await;
        }
        if self.superseded(ticket) {
            tracing::debug!(ticket, "Render superseded before start");
            return Ok(None);
        }

        let logo: Option<RgbaImage> = match config.logo.clone() {
            Some(logo) => {
                let decoded = match task::spawn_blocking(move || decode_logo(&logo.image_bytes)).await {
                    Ok(result) => result,
                    Err(err) => return discard(ticket, err),
                };
                if self.superseded(ticket) {
                    tracing::debug!(ticket, "Render superseded during logo decode");
                    return Ok(None);
                }
                Some(decoded?)
            }
            None => None,
        };

        let rendered =
            match task::spawn_blocking(move || pipeline::render_with_logo(&config, logo.as_ref())).await {
                Ok(result) => result,
                Err(err) => return discard(ticket, err),
            };
        if self.superseded(ticket) {
            tracing::debug!(ticket, "Render superseded during render");
            return Ok(None);
        }
        Ok(Some(rendered?))
    }
}

/// A blocking task that panicked re-raises the panic; one cancelled by a
/// runtime shutdown is simply dropped.
fn discard<T>(ticket: u64, err: JoinError) -> Result<Option<T>> {
    if err.is_panic() {
        std::panic::resume_unwind(err.into_panic());
    }
    tracing::warn!(ticket, "Render task cancelled");
    Ok(None)
}
