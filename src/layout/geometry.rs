//! View frames and anchor arithmetic
//!
//! A frame is stored as origin plus size. Anchor writes only move the origin,
//! so the size a view had before a write is the size it has after it.

use kurbo::{Point, Rect, Size};

use super::anchor::{Baseline, Basepoint};

/// The spatial extent of a view in its parent's coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.baseline(Baseline::CenterX),
            self.baseline(Baseline::CenterY),
        )
    }

    /// Copy of the frame moved to `origin`, same size
    pub fn with_origin(&self, origin: Point) -> Frame {
        Frame::from_origin_size(origin, self.size())
    }

    /// The frame seen from its own coordinate space: origin zero, same size
    pub fn bounds(&self) -> Frame {
        self.with_origin(Point::ZERO)
    }

    /// Coordinate of a baseline (x for horizontal baselines, y for vertical ones)
    pub fn baseline(&self, baseline: Baseline) -> f64 {
        match baseline {
            Baseline::Top => self.y,
            Baseline::Left => self.x,
            Baseline::Right => self.right(),
            Baseline::Bottom => self.bottom(),
            Baseline::CenterX => self.x + self.width / 2.0,
            Baseline::CenterY => self.y + self.height / 2.0,
        }
    }

    /// Copy of the frame translated so `baseline` sits at `value`
    pub fn with_baseline(&self, baseline: Baseline, value: f64) -> Frame {
        let mut origin = self.origin();
        match baseline {
            Baseline::Top => origin.y = value,
            Baseline::Bottom => origin.y = value - self.height,
            Baseline::CenterY => origin.y = value - self.height / 2.0,
            Baseline::Left => origin.x = value,
            Baseline::Right => origin.x = value - self.width,
            Baseline::CenterX => origin.x = value - self.width / 2.0,
        }
        self.with_origin(origin)
    }

    /// Point where the two baselines of `basepoint` cross
    pub fn basepoint(&self, basepoint: Basepoint) -> Point {
        Point::new(
            self.baseline(basepoint.horizontal()),
            self.baseline(basepoint.vertical()),
        )
    }

    /// Copy of the frame translated so `basepoint` sits at `point`
    pub fn with_basepoint(&self, basepoint: Basepoint, point: Point) -> Frame {
        self.with_baseline(basepoint.horizontal(), point.x)
            .with_baseline(basepoint.vertical(), point.y)
    }

    pub fn to_rect(&self) -> Rect {
        Rect::from_origin_size(self.origin(), self.size())
    }
}

impl From<Rect> for Frame {
    fn from(rect: Rect) -> Self {
        let rect = rect.abs();
        Frame::from_origin_size(rect.origin(), rect.size())
    }
}

impl From<Frame> for Rect {
    fn from(frame: Frame) -> Self {
        frame.to_rect()
    }
}
