//! Assertions: one anchor of one view tied to a literal or computed value

use std::fmt;

use kurbo::Point;

use super::anchor::{Anchor, Baseline, Basepoint};
use super::error::LayoutError;
use super::geometry::Frame;
use super::tree::{ViewFrames, ViewId};

/// The view a dynamic source reads its geometry from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    /// The container being laid out, seen through its bounds (origin zero)
    Container,
    /// The assertion's own target view
    Target,
    /// Any view, through its frame
    View(ViewId),
}

impl Reference {
    /// Current geometry of the referenced view
    pub fn geometry(
        self,
        container: ViewId,
        target: ViewId,
        views: &dyn ViewFrames,
    ) -> Result<Frame, LayoutError> {
        match self {
            Reference::Container => views
                .frame(container)
                .map(|frame| frame.bounds())
                .ok_or(LayoutError::dangling(container)),
            Reference::Target => views.frame(target).ok_or(LayoutError::dangling(target)),
            Reference::View(view) => views.frame(view).ok_or(LayoutError::dangling(view)),
        }
    }
}

/// A value computed from a reference view's geometry at resolution time
pub struct Dynamic<T> {
    reference: Reference,
    compute: Box<dyn Fn(Frame) -> T>,
}

impl<T> Dynamic<T> {
    pub fn new(reference: Reference, compute: impl Fn(Frame) -> T + 'static) -> Self {
        Self {
            reference,
            compute: Box::new(compute),
        }
    }

    pub fn reference(&self) -> Reference {
        self.reference
    }

    pub fn evaluate(&self, geometry: Frame) -> T {
        (self.compute)(geometry)
    }
}

impl<T> fmt::Debug for Dynamic<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dynamic")
            .field("reference", &self.reference)
            .finish_non_exhaustive()
    }
}

/// Where an assertion gets its value from
#[derive(Debug)]
pub enum Source<T> {
    Literal(T),
    Dynamic(Dynamic<T>),
}

impl<T: Copy> Source<T> {
    /// Computed from the container's bounds
    pub fn container(compute: impl Fn(Frame) -> T + 'static) -> Self {
        Source::Dynamic(Dynamic::new(Reference::Container, compute))
    }

    /// Computed from the target's own frame
    pub fn target(compute: impl Fn(Frame) -> T + 'static) -> Self {
        Source::Dynamic(Dynamic::new(Reference::Target, compute))
    }

    /// Computed from another view's frame
    pub fn view(view: ViewId, compute: impl Fn(Frame) -> T + 'static) -> Self {
        Source::Dynamic(Dynamic::new(Reference::View(view), compute))
    }

    /// Resolve to a concrete value; dynamic sources read the tree now
    pub fn resolve(
        &self,
        container: ViewId,
        target: ViewId,
        views: &dyn ViewFrames,
    ) -> Result<T, LayoutError> {
        match self {
            Source::Literal(value) => Ok(*value),
            Source::Dynamic(dynamic) => {
                let geometry = dynamic.reference.geometry(container, target, views)?;
                Ok(dynamic.evaluate(geometry))
            }
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Source::Dynamic(_))
    }
}

impl From<f64> for Source<f64> {
    fn from(value: f64) -> Self {
        Source::Literal(value)
    }
}

impl From<Point> for Source<Point> {
    fn from(point: Point) -> Self {
        Source::Literal(point)
    }
}

impl From<(f64, f64)> for Source<Point> {
    fn from((x, y): (f64, f64)) -> Self {
        Source::Literal(Point::new(x, y))
    }
}

/// One declared constraint
#[derive(Debug)]
pub enum Assertion {
    Baseline {
        target: ViewId,
        baseline: Baseline,
        source: Source<f64>,
    },
    Basepoint {
        target: ViewId,
        basepoint: Basepoint,
        source: Source<Point>,
    },
}

impl Assertion {
    pub fn baseline(target: ViewId, baseline: Baseline, source: impl Into<Source<f64>>) -> Self {
        Assertion::Baseline {
            target,
            baseline,
            source: source.into(),
        }
    }

    pub fn basepoint(
        target: ViewId,
        basepoint: Basepoint,
        source: impl Into<Source<Point>>,
    ) -> Self {
        Assertion::Basepoint {
            target,
            basepoint,
            source: source.into(),
        }
    }

    pub fn target(&self) -> ViewId {
        match self {
            Assertion::Baseline { target, .. } | Assertion::Basepoint { target, .. } => *target,
        }
    }

    pub fn anchor(&self) -> Anchor {
        match self {
            Assertion::Baseline { baseline, .. } => Anchor::Baseline(*baseline),
            Assertion::Basepoint { basepoint, .. } => Anchor::Basepoint(*basepoint),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        match self {
            Assertion::Baseline { source, .. } => source.is_dynamic(),
            Assertion::Basepoint { source, .. } => source.is_dynamic(),
        }
    }

    /// Resolve the source and write the target's new frame
    ///
    /// A basepoint is written with a single `set_frame` call so both
    /// coordinates change together.
    pub fn apply(
        &self,
        container: ViewId,
        views: &mut dyn ViewFrames,
    ) -> Result<Frame, LayoutError> {
        let target = self.target();
        let next = match self {
            Assertion::Baseline {
                baseline, source, ..
            } => {
                let value = source.resolve(container, target, views)?;
                current_frame(target, views)?.with_baseline(*baseline, value)
            }
            Assertion::Basepoint {
                basepoint, source, ..
            } => {
                let point = source.resolve(container, target, views)?;
                current_frame(target, views)?.with_basepoint(*basepoint, point)
            }
        };
        views.set_frame(target, next)?;
        Ok(next)
    }
}

fn current_frame(target: ViewId, views: &dyn ViewFrames) -> Result<Frame, LayoutError> {
    views.frame(target).ok_or(LayoutError::dangling(target))
}
