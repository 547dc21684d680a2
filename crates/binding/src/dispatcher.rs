//! Routes decoded frames to the binder.
//!
//! Order within one frame is fixed: augment hook, then the `nav`, `status`,
//! `am` and `connection` sections, then the post-update hook.

use std::fmt;
use thiserror::Error;
use tracing::{debug, trace};

use crate::binder::{BindOutcome, Binder};
use crate::document::Document;
use crate::frame::{Frame, MarkerFilter, Section};

/// Called with the full frame before binding, to inject derived fields
pub type AugmentHook = Box<dyn FnMut(&mut Frame) + Send>;

/// Called with the full frame after binding, for elements outside the naming scheme
pub type PostUpdateHook = Box<dyn FnMut(&Frame) + Send>;

/// Dispatch errors
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The frame was not a JSON object of section objects
    #[error("Malformed frame: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Optional callbacks supplied by the embedding display.
#[derive(Default)]
pub struct DispatchHooks {
    /// Pre-bind augmentation
    pub augment: Option<AugmentHook>,
    /// Post-bind update
    pub post_update: Option<PostUpdateHook>,
}

impl DispatchHooks {
    /// No hooks
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the augment hook
    pub fn with_augment<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut Frame) + Send + 'static,
    {
        self.augment = Some(Box::new(hook));
        self
    }

    /// Register the post-update hook
    pub fn with_post_update<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&Frame) + Send + 'static,
    {
        self.post_update = Some(Box::new(hook));
        self
    }
}

impl fmt::Debug for DispatchHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchHooks")
            .field("augment", &self.augment.is_some())
            .field("post_update", &self.post_update.is_some())
            .finish()
    }
}

/// What one frame did to the display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchReport {
    /// Sections that were bound, in order
    pub sections: Vec<Section>,
    /// The `am` section was present but rejected by the marker filter
    pub marker_filtered: bool,
    /// Combined binding outcome across sections
    pub outcome: BindOutcome,
}

/// Decodes frames and binds their sections onto a document.
#[derive(Debug)]
pub struct MessageDispatcher {
    binder: Binder,
    hooks: DispatchHooks,
    marker_filter: MarkerFilter,
}

impl MessageDispatcher {
    /// Create a dispatcher without hooks
    pub fn new(marker_filter: MarkerFilter) -> Self {
        Self::with_hooks(DispatchHooks::new(), marker_filter)
    }

    /// Create a dispatcher with hooks
    pub fn with_hooks(hooks: DispatchHooks, marker_filter: MarkerFilter) -> Self {
        Self {
            binder: Binder::new(),
            hooks,
            marker_filter,
        }
    }

    /// Handle shared with the operator
    pub fn marker_filter(&self) -> &MarkerFilter {
        &self.marker_filter
    }

    /// Decode a raw text frame and dispatch it.
    pub fn on_frame<D: Document + ?Sized>(
        &mut self,
        document: &mut D,
        raw: &str,
    ) -> Result<DispatchReport, DispatchError> {
        let frame = Frame::parse(raw)?;
        Ok(self.dispatch(document, frame))
    }

    /// Dispatch an already decoded frame.
    pub fn dispatch<D: Document + ?Sized>(
        &mut self,
        document: &mut D,
        mut frame: Frame,
    ) -> DispatchReport {
        if let Some(augment) = self.hooks.augment.as_mut() {
            augment(&mut frame);
        }

        let mut report = DispatchReport::default();
        for section in Section::ALL {
            let Some(mapping) = frame.section(section) else {
                continue;
            };

            if section == Section::Marker && !self.marker_filter.admits(mapping) {
                trace!(filter = ?self.marker_filter.get(), "Marker filtered out");
                report.marker_filtered = true;
                continue;
            }

            let outcome = self.binder.bind_all(document, mapping);
            trace!(%section, updated = outcome.updated, "Bound section");
            report.outcome.merge(outcome);
            report.sections.push(section);
        }

        if let Some(post_update) = self.hooks.post_update.as_mut() {
            post_update(&frame);
        }

        debug!(
            sections = report.sections.len(),
            updated = report.outcome.updated,
            failures = report.outcome.failures.len(),
            "Frame dispatched"
        );
        report
    }
}
