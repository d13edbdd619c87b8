//! Anchor calculations for natural flow and explicit positions
//!
//! Both entry points place the top-left corner of a text block. Natural flow
//! anchors against the canvas edges and margins, explicit positions (`\pos`,
//! the start point of `\move`) anchor the alignment point on the given
//! coordinate, matching libass.

use super::{Alignment, HorizontalAlign, VerticalAlign};
use crate::event::{Margins, Point};

/// Size of a laid out text block
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlockSize {
    /// Widest line
    pub width: f32,
    /// Sum of line heights
    pub height: f32,
}

/// Canvas dimensions the block is placed on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

/// Top-left corner for natural (margin-relative) flow
pub fn natural_origin(
    alignment: Alignment,
    block: BlockSize,
    canvas: Canvas,
    margins: &Margins,
) -> Point {
    let x = match alignment.horizontal() {
        HorizontalAlign::Left => margins.left,
        HorizontalAlign::Center => {
            let usable = canvas.width - margins.left - margins.right;
            margins.left + (usable - block.width) / 2.0
        }
        HorizontalAlign::Right => canvas.width - margins.right - block.width,
    };

    let y = match alignment.vertical() {
        VerticalAlign::Top => margins.vertical,
        VerticalAlign::Middle => (canvas.height - block.height) / 2.0,
        VerticalAlign::Bottom => canvas.height - margins.vertical - block.height,
    };

    Point::new(x, y)
}

/// Top-left corner for a block whose alignment point sits on `point`
pub fn anchored_origin(alignment: Alignment, block: BlockSize, point: Point) -> Point {
    Point::new(
        point.x - alignment_offset_x(alignment, block),
        point.y - alignment_offset_y(alignment, block),
    )
}

/// Horizontal distance from the block's left edge to its alignment point
fn alignment_offset_x(alignment: Alignment, block: BlockSize) -> f32 {
    match alignment.horizontal() {
        HorizontalAlign::Left => 0.0,
        HorizontalAlign::Center => block.width / 2.0,
        HorizontalAlign::Right => block.width,
    }
}

/// Vertical distance from the block's top edge to its alignment point
fn alignment_offset_y(alignment: Alignment, block: BlockSize) -> f32 {
    match alignment.vertical() {
        VerticalAlign::Top => 0.0,
        VerticalAlign::Middle => block.height / 2.0,
        VerticalAlign::Bottom => block.height,
    }
}

/// Offset of a line inside its block for the given horizontal alignment
pub fn line_offset(alignment: Alignment, block_width: f32, line_width: f32) -> f32 {
    match alignment.horizontal() {
        HorizontalAlign::Left => 0.0,
        HorizontalAlign::Center => (block_width - line_width) / 2.0,
        HorizontalAlign::Right => block_width - line_width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK: BlockSize = BlockSize {
        width: 100.0,
        height: 50.0,
    };
    const CANVAS: Canvas = Canvas {
        width: 1920.0,
        height: 1080.0,
    };

    #[test]
    fn test_alignment_positions() {
        let margins = Margins::default();

        let bottom_center = natural_origin(Alignment::BottomCenter, BLOCK, CANVAS, &margins);
        assert_eq!(bottom_center, Point::new(910.0, 1030.0));

        let top_left = natural_origin(Alignment::TopLeft, BLOCK, CANVAS, &margins);
        assert_eq!(top_left, Point::new(0.0, 0.0));

        let middle_right = natural_origin(Alignment::MiddleRight, BLOCK, CANVAS, &margins);
        assert_eq!(middle_right, Point::new(1820.0, 515.0));
    }

    #[test]
    fn margins_shift_natural_flow() {
        let margins = Margins {
            left: 40.0,
            right: 20.0,
            vertical: 30.0,
        };

        let bottom_left = natural_origin(Alignment::BottomLeft, BLOCK, CANVAS, &margins);
        assert_eq!(bottom_left, Point::new(40.0, 1000.0));

        // centered inside the usable width, not the canvas
        let top_center = natural_origin(Alignment::TopCenter, BLOCK, CANVAS, &margins);
        assert_eq!(top_center, Point::new(920.0, 30.0));
    }

    #[test]
    fn test_explicit_position() {
        let origin = anchored_origin(Alignment::BottomCenter, BLOCK, Point::new(500.0, 300.0));
        assert_eq!(origin, Point::new(450.0, 250.0));

        let origin = anchored_origin(Alignment::TopLeft, BLOCK, Point::new(500.0, 300.0));
        assert_eq!(origin, Point::new(500.0, 300.0));

        let origin = anchored_origin(Alignment::Center, BLOCK, Point::new(500.0, 300.0));
        assert_eq!(origin, Point::new(450.0, 275.0));
    }

    #[test]
    fn lines_align_inside_block() {
        assert_eq!(line_offset(Alignment::TopLeft, 200.0, 120.0), 0.0);
        assert_eq!(line_offset(Alignment::Center, 200.0, 120.0), 40.0);
        assert_eq!(line_offset(Alignment::BottomRight, 200.0, 120.0), 80.0);
    }
}
