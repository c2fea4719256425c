//! Anchor resolution engine
//!
//! A [`LayoutEngine`] owns an ordered list of [`Assertion`]s. Each time the
//! container it is attached to lays out, the list is walked once, front to
//! back, and every assertion writes its target's frame before the next one is
//! evaluated.
//!
//! ## Ordering
//!
//! Declaration order is evaluation order, and writes are visible immediately.
//! An assertion that reads a view positioned earlier in the same list sees the
//! new geometry; one that reads a view positioned *later* sees its geometry
//! from before the pass. Nothing is reordered and cycles are not detected, so
//! dependent assertions must be declared after the ones they depend on.
//!
//! ## Example
//!
//! ```rust
//! use anchor_layout::layout::{Frame, LayoutEngine, Source, ViewTree};
//!
//! let mut tree = ViewTree::new();
//! let root = tree.add_root(Frame::new(0.0, 0.0, 320.0, 480.0));
//! let header = tree.add_subview(root, Frame::new(0.0, 0.0, 320.0, 44.0)).unwrap();
//! let body = tree.add_subview(root, Frame::new(0.0, 0.0, 320.0, 100.0)).unwrap();
//!
//! let mut engine = LayoutEngine::new();
//! engine
//!     .fix_top_left(header, (0.0, 20.0))
//!     .fix_top(body, Source::view(header, |r| r.bottom() + 8.0));
//! let engine = engine.shared();
//!
//! tree.attach_exclusive(root, &engine).unwrap();
//! tree.layout(root).unwrap();
//!
//! assert_eq!(tree.frame(body).unwrap().y, 72.0);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::Point;

use super::anchor::{Baseline, Basepoint};
use super::assertion::{Assertion, Source};
use super::config::DanglingPolicy;
use super::error::LayoutError;
use super::tree::{LayoutParticipant, ViewFrames, ViewId};

/// Shared handle to an engine, so it can be edited after attachment
pub type SharedEngine = Rc<RefCell<LayoutEngine>>;

/// A skipped assertion and why
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Position of the assertion in its engine's list
    pub index: usize,
    pub target: ViewId,
    pub error: LayoutError,
}

/// Outcome of one container's layout pass
#[derive(Debug, Clone, PartialEq)]
pub struct PassReport {
    pub container: ViewId,
    /// Whether the container's native layout ran
    pub native: bool,
    /// Assertions written
    pub applied: usize,
    /// Assertions skipped, in list order
    pub skipped: Vec<Diagnostic>,
}

impl PassReport {
    pub fn new(container: ViewId) -> Self {
        Self {
            container,
            native: false,
            applied: 0,
            skipped: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Ordered anchor assertions for the subviews of one container
#[derive(Debug, Default)]
pub struct LayoutEngine {
    assertions: Vec<Assertion>,
    container: Option<ViewId>,
    dangling: DanglingPolicy,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap in a shared handle for attachment
    pub fn shared(self) -> SharedEngine {
        Rc::new(RefCell::new(self))
    }

    /// Set what happens to assertions whose views are gone
    pub fn on_dangling(&mut self, policy: DanglingPolicy) -> &mut Self {
        self.dangling = policy;
        self
    }

    pub fn dangling_policy(&self) -> DanglingPolicy {
        self.dangling
    }

    /// Container this engine is attached to, if any
    pub fn container(&self) -> Option<ViewId> {
        self.container
    }

    pub fn assertions(&self) -> &[Assertion] {
        &self.assertions
    }

    pub fn len(&self) -> usize {
        self.assertions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assertions.is_empty()
    }

    /// Append an assertion to the end of the list
    pub fn push(&mut self, assertion: Assertion) -> &mut Self {
        self.assertions.push(assertion);
        self
    }

    pub fn fix_baseline(
        &mut self,
        view: ViewId,
        baseline: Baseline,
        source: impl Into<Source<f64>>,
    ) -> &mut Self {
        self.push(Assertion::baseline(view, baseline, source))
    }

    pub fn fix_basepoint(
        &mut self,
        view: ViewId,
        basepoint: Basepoint,
        source: impl Into<Source<Point>>,
    ) -> &mut Self {
        self.push(Assertion::basepoint(view, basepoint, source))
    }

    /// Fix the point where two baselines cross
    ///
    /// Fails without touching the list when both baselines share an axis.
    pub fn fix_pair(
        &mut self,
        view: ViewId,
        a: Baseline,
        b: Baseline,
        source: impl Into<Source<Point>>,
    ) -> Result<&mut Self, LayoutError> {
        let basepoint = Basepoint::new(a, b)?;
        Ok(self.fix_basepoint(view, basepoint, source))
    }

    pub fn fix_top(&mut self, view: ViewId, source: impl Into<Source<f64>>) -> &mut Self {
        self.fix_baseline(view, Baseline::Top, source)
    }

    pub fn fix_left(&mut self, view: ViewId, source: impl Into<Source<f64>>) -> &mut Self {
        self.fix_baseline(view, Baseline::Left, source)
    }

    pub fn fix_right(&mut self, view: ViewId, source: impl Into<Source<f64>>) -> &mut Self {
        self.fix_baseline(view, Baseline::Right, source)
    }

    pub fn fix_bottom(&mut self, view: ViewId, source: impl Into<Source<f64>>) -> &mut Self {
        self.fix_baseline(view, Baseline::Bottom, source)
    }

    pub fn fix_center_x(&mut self, view: ViewId, source: impl Into<Source<f64>>) -> &mut Self {
        self.fix_baseline(view, Baseline::CenterX, source)
    }

    pub fn fix_center_y(&mut self, view: ViewId, source: impl Into<Source<f64>>) -> &mut Self {
        self.fix_baseline(view, Baseline::CenterY, source)
    }

    pub fn fix_top_left(&mut self, view: ViewId, source: impl Into<Source<Point>>) -> &mut Self {
        self.fix_basepoint(view, Basepoint::TOP_LEFT, source)
    }

    pub fn fix_top_right(&mut self, view: ViewId, source: impl Into<Source<Point>>) -> &mut Self {
        self.fix_basepoint(view, Basepoint::TOP_RIGHT, source)
    }

    pub fn fix_bottom_left(
        &mut self,
        view: ViewId,
        source: impl Into<Source<Point>>,
    ) -> &mut Self {
        self.fix_basepoint(view, Basepoint::BOTTOM_LEFT, source)
    }

    pub fn fix_bottom_right(
        &mut self,
        view: ViewId,
        source: impl Into<Source<Point>>,
    ) -> &mut Self {
        self.fix_basepoint(view, Basepoint::BOTTOM_RIGHT, source)
    }

    pub fn fix_center(&mut self, view: ViewId, source: impl Into<Source<Point>>) -> &mut Self {
        self.fix_basepoint(view, Basepoint::CENTER, source)
    }

    /// Run one resolution pass for `container`
    ///
    /// Dangling references are skipped or abort the pass according to the
    /// engine's [`DanglingPolicy`]; any other error aborts the pass. Frames
    /// written before an abort stay written.
    pub fn resolve(
        &self,
        container: ViewId,
        views: &mut dyn ViewFrames,
    ) -> Result<PassReport, LayoutError> {
        let mut report = PassReport::new(container);
        tracing::debug!(%container, assertions = self.assertions.len(), "resolving anchors");

        for (index, assertion) in self.assertions.iter().enumerate() {
            let target = assertion.target();
            match assertion.apply(container, views) {
                Ok(frame) => {
                    let anchor = assertion.anchor();
                    tracing::trace!(index, %target, %anchor, ?frame, "applied");
                    report.applied += 1;
                }
                Err(error) if !error.is_fatal() && self.dangling == DanglingPolicy::Skip => {
                    tracing::warn!(%container, index, %target, %error, "skipping assertion");
                    report.skipped.push(Diagnostic {
                        index,
                        target,
                        error,
                    });
                }
                Err(error) => {
                    tracing::error!(%container, index, %target, %error, "layout pass aborted");
                    return Err(error);
                }
            }
        }
        Ok(report)
    }
}

impl LayoutParticipant for LayoutEngine {
    fn layout_subviews(
        &mut self,
        container: ViewId,
        views: &mut dyn ViewFrames,
    ) -> Result<PassReport, LayoutError> {
        self.resolve(container, views)
    }

    fn attached(&mut self, container: Option<ViewId>) {
        self.container = container;
    }
}
