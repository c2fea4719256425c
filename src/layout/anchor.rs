//! Anchor vocabulary: baselines, basepoints and their bit-flag composition
//!
//! A [`Baseline`] names one edge or center axis of a view. A [`Basepoint`] is
//! the union of one horizontal and one vertical baseline, so corners and the
//! center are expressed as `Baseline::Top | Baseline::Left` and friends.

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use super::error::LayoutError;

/// The axis a baseline constrains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// x coordinates: left, right, center_x
    Horizontal,
    /// y coordinates: top, bottom, center_y
    Vertical,
}

/// A single-axis anchor of a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Baseline {
    Top = 1 << 1,
    Left = 1 << 2,
    Right = 1 << 3,
    Bottom = 1 << 4,
    /// Vertical line through the center (constrains x)
    CenterX = 1 << 5,
    /// Horizontal line through the center (constrains y)
    CenterY = 1 << 6,
}

impl Baseline {
    pub const ALL: [Baseline; 6] = [
        Baseline::Top,
        Baseline::Left,
        Baseline::Right,
        Baseline::Bottom,
        Baseline::CenterX,
        Baseline::CenterY,
    ];

    /// Bit flag of this baseline
    pub const fn bits(self) -> u8 {
        self as u8
    }

    pub fn axis(self) -> Axis {
        match self {
            Baseline::Left | Baseline::Right | Baseline::CenterX => Axis::Horizontal,
            Baseline::Top | Baseline::Bottom | Baseline::CenterY => Axis::Vertical,
        }
    }

    /// Look up a baseline by its exact bit flag
    pub fn from_bits(bits: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.bits() == bits)
    }

    pub fn name(self) -> &'static str {
        match self {
            Baseline::Top => "top",
            Baseline::Left => "left",
            Baseline::Right => "right",
            Baseline::Bottom => "bottom",
            Baseline::CenterX => "center_x",
            Baseline::CenterY => "center_y",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }
}

impl fmt::Display for Baseline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl BitOr for Baseline {
    type Output = u8;

    fn bitor(self, rhs: Baseline) -> u8 {
        self.bits() | rhs.bits()
    }
}

impl BitOr<Baseline> for u8 {
    type Output = u8;

    fn bitor(self, rhs: Baseline) -> u8 {
        self | rhs.bits()
    }
}

/// A two-axis anchor: one horizontal and one vertical baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Basepoint {
    horizontal: Baseline,
    vertical: Baseline,
}

impl Basepoint {
    pub const TOP_LEFT: Basepoint = Basepoint::orthogonal(Baseline::Left, Baseline::Top);
    pub const TOP_RIGHT: Basepoint = Basepoint::orthogonal(Baseline::Right, Baseline::Top);
    pub const BOTTOM_LEFT: Basepoint = Basepoint::orthogonal(Baseline::Left, Baseline::Bottom);
    pub const BOTTOM_RIGHT: Basepoint = Basepoint::orthogonal(Baseline::Right, Baseline::Bottom);
    pub const CENTER: Basepoint = Basepoint::orthogonal(Baseline::CenterX, Baseline::CenterY);

    const fn orthogonal(horizontal: Baseline, vertical: Baseline) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Pair two baselines, in either order
    ///
    /// Fails with [`LayoutError::InvalidAnchorCombination`] when both lie on
    /// the same axis.
    pub fn new(a: Baseline, b: Baseline) -> Result<Self, LayoutError> {
        match (a.axis(), b.axis()) {
            (Axis::Horizontal, Axis::Vertical) => Ok(Self::orthogonal(a, b)),
            (Axis::Vertical, Axis::Horizontal) => Ok(Self::orthogonal(b, a)),
            (axis, _) => Err(LayoutError::invalid_combination(
                format!("{}|{}", a, b),
                match axis {
                    Axis::Horizontal => "both baselines lie on the horizontal axis",
                    Axis::Vertical => "both baselines lie on the vertical axis",
                },
            )),
        }
    }

    /// Decode an OR of exactly two baseline flags
    pub fn from_bits(bits: u8) -> Result<Self, LayoutError> {
        let parts: Vec<Baseline> = Baseline::ALL
            .into_iter()
            .filter(|b| bits & b.bits() != 0)
            .collect();
        let known = parts.iter().fold(0u8, |acc, b| acc | *b);

        if known != bits {
            return Err(LayoutError::invalid_combination(
                format!("{:#010b}", bits),
                "contains bits that name no baseline",
            ));
        }
        match parts.as_slice() {
            [a, b] => Self::new(*a, *b),
            _ => Err(LayoutError::invalid_combination(
                format!("{:#010b}", bits),
                format!("expected exactly two baselines, found {}", parts.len()),
            )),
        }
    }

    pub fn horizontal(self) -> Baseline {
        self.horizontal
    }

    pub fn vertical(self) -> Baseline {
        self.vertical
    }

    pub fn bits(self) -> u8 {
        self.horizontal | self.vertical
    }

    /// Conventional name for the five named basepoints, `None` otherwise
    pub fn name(self) -> Option<&'static str> {
        match (self.horizontal, self.vertical) {
            (Baseline::Left, Baseline::Top) => Some("top_left"),
            (Baseline::Right, Baseline::Top) => Some("top_right"),
            (Baseline::Left, Baseline::Bottom) => Some("bottom_left"),
            (Baseline::Right, Baseline::Bottom) => Some("bottom_right"),
            (Baseline::CenterX, Baseline::CenterY) => Some("center"),
            _ => None,
        }
    }
}

impl fmt::Display for Basepoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}|{}", self.vertical, self.horizontal),
        }
    }
}

impl TryFrom<u8> for Basepoint {
    type Error = LayoutError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::from_bits(bits)
    }
}

/// Either kind of anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    Baseline(Baseline),
    Basepoint(Basepoint),
}

impl From<Baseline> for Anchor {
    fn from(baseline: Baseline) -> Self {
        Anchor::Baseline(baseline)
    }
}

impl From<Basepoint> for Anchor {
    fn from(basepoint: Basepoint) -> Self {
        Anchor::Basepoint(basepoint)
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::Baseline(b) => b.fmt(f),
            Anchor::Basepoint(p) => p.fmt(f),
        }
    }
}

/// Names accepted by [`Anchor::from_str`], used for suggestions
pub const ANCHOR_NAMES: [&str; 11] = [
    "top",
    "left",
    "right",
    "bottom",
    "center_x",
    "center_y",
    "top_left",
    "top_right",
    "bottom_left",
    "bottom_right",
    "center",
];

/// Error for anchor names that match nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorParseError {
    Unknown(String),
    Invalid(LayoutError),
}

impl FromStr for Anchor {
    type Err = AnchorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some((a, b)) = s.split_once('|') {
            let a = Baseline::from_name(a.trim())
                .ok_or_else(|| AnchorParseError::Unknown(a.trim().to_string()))?;
            let b = Baseline::from_name(b.trim())
                .ok_or_else(|| AnchorParseError::Unknown(b.trim().to_string()))?;
            return Basepoint::new(a, b)
                .map(Anchor::Basepoint)
                .map_err(AnchorParseError::Invalid);
        }

        if let Some(baseline) = Baseline::from_name(s) {
            return Ok(Anchor::Baseline(baseline));
        }
        let basepoint = match s {
            "top_left" => Basepoint::TOP_LEFT,
            "top_right" => Basepoint::TOP_RIGHT,
            "bottom_left" => Basepoint::BOTTOM_LEFT,
            "bottom_right" => Basepoint::BOTTOM_RIGHT,
            "center" => Basepoint::CENTER,
            _ => return Err(AnchorParseError::Unknown(s.to_string())),
        };
        Ok(Anchor::Basepoint(basepoint))
    }
}
