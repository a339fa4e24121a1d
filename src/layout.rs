// src/layout.rs
//! Placement of floating content next to a reference element.
//!
//! Coordinates are viewport pixels. The floating element is placed on the
//! requested side of the reference, optionally flipped to the opposite side
//! when it would leave the viewport, and optionally shifted along the other
//! axis to stay inside it.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    fn is_vertical(self) -> bool {
        matches!(self, Side::Top | Side::Bottom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PopoverPosition {
    Auto,
    Top,
    TopStart,
    TopEnd,
    Right,
    RightStart,
    RightEnd,
    #[default]
    Bottom,
    BottomStart,
    BottomEnd,
    Left,
    LeftStart,
    LeftEnd,
}

impl PopoverPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            PopoverPosition::Auto => "auto",
            PopoverPosition::Top => "top",
            PopoverPosition::TopStart => "top-start",
            PopoverPosition::TopEnd => "top-end",
            PopoverPosition::Right => "right",
            PopoverPosition::RightStart => "right-start",
            PopoverPosition::RightEnd => "right-end",
            PopoverPosition::Bottom => "bottom",
            PopoverPosition::BottomStart => "bottom-start",
            PopoverPosition::BottomEnd => "bottom-end",
            PopoverPosition::Left => "left",
            PopoverPosition::LeftStart => "left-start",
            PopoverPosition::LeftEnd => "left-end",
        }
    }

    fn from_parts(side: Side, alignment: Alignment) -> Self {
        use Alignment::*;
        match (side, alignment) {
            (Side::Top, Center) => PopoverPosition::Top,
            (Side::Top, Start) => PopoverPosition::TopStart,
            (Side::Top, End) => PopoverPosition::TopEnd,
            (Side::Right, Center) => PopoverPosition::Right,
            (Side::Right, Start) => PopoverPosition::RightStart,
            (Side::Right, End) => PopoverPosition::RightEnd,
            (Side::Bottom, Center) => PopoverPosition::Bottom,
            (Side::Bottom, Start) => PopoverPosition::BottomStart,
            (Side::Bottom, End) => PopoverPosition::BottomEnd,
            (Side::Left, Center) => PopoverPosition::Left,
            (Side::Left, Start) => PopoverPosition::LeftStart,
            (Side::Left, End) => PopoverPosition::LeftEnd,
        }
    }

    /// Side and alignment, `None` for `Auto`
    fn parts(&self) -> Option<(Side, Alignment)> {
        use Alignment::*;
        let parts = match self {
            PopoverPosition::Auto => return None,
            PopoverPosition::Top => (Side::Top, Center),
            PopoverPosition::TopStart => (Side::Top, Start),
            PopoverPosition::TopEnd => (Side::Top, End),
            PopoverPosition::Right => (Side::Right, Center),
            PopoverPosition::RightStart => (Side::Right, Start),
            PopoverPosition::RightEnd => (Side::Right, End),
            PopoverPosition::Bottom => (Side::Bottom, Center),
            PopoverPosition::BottomStart => (Side::Bottom, Start),
            PopoverPosition::BottomEnd => (Side::Bottom, End),
            PopoverPosition::Left => (Side::Left, Center),
            PopoverPosition::LeftStart => (Side::Left, Start),
            PopoverPosition::LeftEnd => (Side::Left, End),
        };
        Some(parts)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionOptions {
    pub placement: PopoverPosition,
    pub prevent_overflow: bool,
    pub flip: bool,
    pub arrow: bool,
    pub arrow_size: f64,
    /// (along the reference edge, away from the reference)
    pub offset: (f64, f64),
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            placement: PopoverPosition::Bottom,
            prevent_overflow: false,
            flip: false,
            arrow: true,
            arrow_size: 12.0,
            offset: (0.0, 8.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComputedPosition {
    pub x: f64,
    pub y: f64,
    /// Placement actually used after `auto` and flipping
    pub placement: PopoverPosition,
    /// Arrow offset from the floating element's leading edge
    pub arrow_offset: Option<f64>,
}

fn side_space(side: Side, reference: &Rect, viewport: &Rect) -> f64 {
    match side {
        Side::Top => reference.y - viewport.y,
        Side::Bottom => viewport.bottom() - reference.bottom(),
        Side::Left => reference.x - viewport.x,
        Side::Right => viewport.right() - reference.right(),
    }
}

fn place(side: Side, alignment: Alignment, reference: &Rect, floating: (f64, f64), offset: (f64, f64)) -> (f64, f64) {
    let (width, height) = floating;
    let (skidding, distance) = offset;

    let cross = |start: f64, length: f64, size: f64| match alignment {
        Alignment::Start => start,
        Alignment::Center => start + length / 2.0 - size / 2.0,
        Alignment::End => start + length - size,
    };

    match side {
        Side::Bottom => (cross(reference.x, reference.width, width) + skidding, reference.bottom() + distance),
        Side::Top => (cross(reference.x, reference.width, width) + skidding, reference.y - height - distance),
        Side::Right => (reference.right() + distance, cross(reference.y, reference.height, height) + skidding),
        Side::Left => (reference.x - width - distance, cross(reference.y, reference.height, height) + skidding),
    }
}

/// How far a placement sticks out of the viewport along its main axis
fn main_axis_overflow(side: Side, position: (f64, f64), floating: (f64, f64), viewport: &Rect) -> f64 {
    let (x, y) = position;
    let (width, height) = floating;
    let overflow = match side {
        Side::Bottom => y + height - viewport.bottom(),
        Side::Top => viewport.y - y,
        Side::Right => x + width - viewport.right(),
        Side::Left => viewport.x - x,
    };
    overflow.max(0.0)
}

fn clamp_into(value: f64, min: f64, max: f64) -> f64 {
    if max < min {
        min
    } else {
        value.clamp(min, max)
    }
}

/// Compute where floating content of size `floating` goes.
///
/// Returns `None` until both the reference rect and the floating size are
/// known, so callers can keep the content hidden while elements mount.
pub fn compute_position(
    reference: Option<Rect>,
    floating: Option<(f64, f64)>,
    viewport: Rect,
    options: &PositionOptions,
) -> Option<ComputedPosition> {
    let reference = reference?;
    let floating = floating?;

    let is_auto = options.placement == PopoverPosition::Auto;
    let flip = options.flip || is_auto;
    let prevent_overflow = options.prevent_overflow || is_auto;

    let (mut side, alignment) = options.placement.parts().unwrap_or_else(|| {
        let best = [Side::Bottom, Side::Top, Side::Right, Side::Left]
            .into_iter()
            .fold(Side::Bottom, |best, candidate| {
                if side_space(candidate, &reference, &viewport) > side_space(best, &reference, &viewport) {
                    candidate
                } else {
                    best
                }
            });
        (best, Alignment::Center)
    });

    let mut position = place(side, alignment, &reference, floating, options.offset);

    if flip {
        let overflow = main_axis_overflow(side, position, floating, &viewport);
        if overflow > 0.0 {
            let flipped_side = side.opposite();
            let flipped = place(flipped_side, alignment, &reference, floating, options.offset);
            if main_axis_overflow(flipped_side, flipped, floating, &viewport) < overflow {
                side = flipped_side;
                position = flipped;
            }
        }
    }

    if prevent_overflow {
        let (x, y) = position;
        position = if side.is_vertical() {
            (clamp_into(x, viewport.x, viewport.right() - floating.0), y)
        } else {
            (x, clamp_into(y, viewport.y, viewport.bottom() - floating.1))
        };
    }

    let arrow_offset = options.arrow.then(|| {
        let (x, y) = position;
        if side.is_vertical() {
            let center = reference.x + reference.width / 2.0 - x - options.arrow_size / 2.0;
            clamp_into(center, 0.0, floating.0 - options.arrow_size)
        } else {
            let center = reference.y + reference.height / 2.0 - y - options.arrow_size / 2.0;
            clamp_into(center, 0.0, floating.1 - options.arrow_size)
        }
    });

    Some(ComputedPosition {
        x: position.0,
        y: position.1,
        placement: PopoverPosition::from_parts(side, alignment),
        arrow_offset,
    })
}
