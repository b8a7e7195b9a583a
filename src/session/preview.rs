//! Interactive preview path.
//!
//! Configuration changes arrive faster than renders complete, so the session
//! debounces them (150 ms settle) and tags every accepted render with a
//! generation ticket. A newer request supersedes an older in-flight render;
//! the old render is not interrupted, its completion is simply discarded at
//! the next suspension point (soft cancellation).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::config::FrameConfig;
use crate::encode::{RenderResult, encode_frame};
use crate::foundation::error::FrameResult;
use crate::render::backend::RenderBackend;
use crate::source::PreparedImage;

/// Settle time between the last configuration change and the render it
/// triggers.
pub const PREVIEW_DEBOUNCE: Duration = Duration::from_millis(150);

/// Collapses rapid successive configuration changes into one pending value.
#[derive(Debug)]
pub struct Debouncer {
    settle: Duration,
    pending: Option<FrameConfig>,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Create a debouncer with the given settle window.
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            pending: None,
            deadline: None,
        }
    }

    /// Record a configuration change at time `now`, restarting the settle
    /// window and replacing any previous pending value.
    pub fn submit(&mut self, config: FrameConfig, now: Instant) {
        self.pending = Some(config);
        self.deadline = Some(now + self.settle);
    }

    /// Take the pending configuration once the settle window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<FrameConfig> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.pending.take()
            }
            _ => None,
        }
    }

    /// Return `true` when no configuration change is waiting.
    pub fn is_idle(&self) -> bool {
        self.pending.is_none()
    }
}

/// Generation tag for one render attempt.
///
/// A ticket stays current until the session issues a newer one; stale
/// tickets make the render's result get dropped instead of displayed.
#[derive(Clone, Debug)]
pub struct RenderTicket {
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl RenderTicket {
    /// Return `true` when no newer render has been issued since this one.
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::Acquire) == self.generation
    }
}

/// Debounced, soft-cancelling driver for the interactive preview.
pub struct PreviewSession {
    backend: Box<dyn RenderBackend>,
    debouncer: Debouncer,
    latest: Arc<AtomicU64>,
}

impl PreviewSession {
    /// Create a session around a rendering backend with the standard
    /// debounce window.
    pub fn new(backend: Box<dyn RenderBackend>) -> Self {
        Self::with_settle(backend, PREVIEW_DEBOUNCE)
    }

    /// Create a session with a custom settle window (tests use zero).
    pub fn with_settle(backend: Box<dyn RenderBackend>, settle: Duration) -> Self {
        Self {
            backend,
            debouncer: Debouncer::new(settle),
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record a configuration change at time `now`.
    pub fn request(&mut self, config: FrameConfig, now: Instant) {
        self.debouncer.submit(config, now);
    }

    /// Issue a new render generation, superseding all earlier tickets.
    pub fn issue_ticket(&self) -> RenderTicket {
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        RenderTicket {
            generation,
            latest: self.latest.clone(),
        }
    }

    /// Render a preview under an explicit ticket.
    ///
    /// Returns `Ok(None)` when the ticket went stale at a suspension point
    /// (after compositing, after encoding); the result of a superseded
    /// render must never reach the screen.
    pub fn render_preview(
        &mut self,
        image: &PreparedImage,
        config: &FrameConfig,
        ticket: &RenderTicket,
    ) -> FrameResult<Option<RenderResult>> {
        let frame = self.backend.render_framed(image, config)?;
        if !ticket.is_current() {
            return Ok(None);
        }
        let blob = encode_frame(&frame, config.format)?;
        if !ticket.is_current() {
            return Ok(None);
        }
        Ok(Some(blob))
    }

    /// Drive the session: render the pending configuration if its settle
    /// window has elapsed, otherwise do nothing.
    pub fn tick(
        &mut self,
        image: &PreparedImage,
        now: Instant,
    ) -> FrameResult<Option<RenderResult>> {
        let Some(config) = self.debouncer.poll(now) else {
            return Ok(None);
        };
        let ticket = self.issue_ticket();
        self.render_preview(image, &config, &ticket)
    }
}
