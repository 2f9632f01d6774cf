//! Drawable primitives and the builders that produce them from a sampled
//! spectrum.

use serde::{Deserialize, Serialize};

use crate::{
    config::{FillMode, Rgba, Style},
    Result, VisualiserError,
};

pub mod bar;
pub mod block;

pub use bar::BarGeometryBuilder;
pub use block::BlockGeometryBuilder;

/// Fraction of a column's width a bar stroke covers.
pub(crate) const STROKE_RATIO: f32 = 0.8;
/// Fraction of a column's width kept free around each drawn element.
pub(crate) const PADDING_RATIO: f32 = 0.1;

/// Destination rectangle for the current frame in device units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetRect {
    pub width: f32,
    pub height: f32,
}

impl TargetRect {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Checks the rectangle can be laid out. Views report a zero width before
    /// their first layout pass.
    pub fn validate(&self) -> Result<()> {
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(VisualiserError::InvalidInput(
                "target width must be positive and finite",
            ));
        }
        if !self.height.is_finite() || self.height < 0.0 {
            return Err(VisualiserError::InvalidInput(
                "target height must be non-negative and finite",
            ));
        }
        Ok(())
    }

    /// Scaled drawable height, rejected when the scale pushes it past `f32`.
    pub(crate) fn max_height(&self, scale: f32) -> Result<f32> {
        let max_height = self.height * scale;
        if !max_height.is_finite() {
            return Err(VisualiserError::InvalidInput(
                "scaled target height overflows",
            ));
        }
        Ok(max_height)
    }

    pub(crate) fn column_width(&self, columns: usize) -> f32 {
        self.width / columns as f32
    }
}

/// A line from `(x0, y0)` to `(x1, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl LineSegment {
    pub fn length(&self) -> f32 {
        (self.x1 - self.x0).hypot(self.y1 - self.y0)
    }
}

/// Axis-aligned rectangle in canvas coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl BlockRect {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// Paint the display surface should use for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paint {
    pub color: Rgba,
    pub stroke_width: f32,
    pub fill: FillMode,
    pub anti_alias: bool,
}

impl Paint {
    pub(crate) fn from_style(style: &Style, stroke_width: f32) -> Self {
        Self {
            color: style.color,
            stroke_width,
            fill: style.fill,
            anti_alias: style.anti_alias,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "lowercase")]
pub enum Primitives {
    Lines(Vec<LineSegment>),
    Blocks(Vec<BlockRect>),
}

impl Primitives {
    pub fn len(&self) -> usize {
        match self {
            Self::Lines(lines) => lines.len(),
            Self::Blocks(blocks) => blocks.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything one renderer produced for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryBatch {
    pub primitives: Primitives,
    pub paint: Paint,
}

impl GeometryBatch {
    pub fn lines(&self) -> Option<&[LineSegment]> {
        match &self.primitives {
            Primitives::Lines(lines) => Some(lines),
            Primitives::Blocks(_) => None,
        }
    }

    pub fn blocks(&self) -> Option<&[BlockRect]> {
        match &self.primitives {
            Primitives::Blocks(blocks) => Some(blocks),
            Primitives::Lines(_) => None,
        }
    }

    /// Line endpoints flattened as `x0, y0, x1, y1` quadruples, the layout
    /// canvas `draw_lines` style calls take.
    pub fn line_points(&self) -> Vec<f32> {
        self.lines()
            .unwrap_or_default()
            .iter()
            .flat_map(|line| [line.x0, line.y0, line.x1, line.y1])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paint() -> Paint {
        Paint::from_style(&Style::default(), 1.0)
    }

    #[test]
    fn flattens_line_endpoints() {
        let batch = GeometryBatch {
            primitives: Primitives::Lines(vec![
                LineSegment { x0: 1.0, y0: 2.0, x1: 1.0, y1: 5.0 },
                LineSegment { x0: 3.0, y0: 2.0, x1: 3.0, y1: 0.0 },
            ]),
            paint: paint(),
        };

        assert_eq!(
            batch.line_points(),
            vec![1.0, 2.0, 1.0, 5.0, 3.0, 2.0, 3.0, 0.0]
        );
        assert_eq!(batch.lines().map(<[_]>::len), Some(2));
        assert!(batch.blocks().is_none());
    }

    #[test]
    fn block_batches_have_no_line_points() {
        let batch = GeometryBatch {
            primitives: Primitives::Blocks(vec![BlockRect {
                left: 0.0,
                top: 1.0,
                right: 2.0,
                bottom: 4.0,
            }]),
            paint: paint(),
        };

        assert!(batch.line_points().is_empty());
        let block = batch.blocks().unwrap()[0];
        assert_eq!(block.width(), 2.0);
        assert_eq!(block.height(), 3.0);
    }

    #[test]
    fn validates_target_rect() {
        assert!(TargetRect::new(0.0, 100.0).validate().is_err());
        assert!(TargetRect::new(-5.0, 100.0).validate().is_err());
        assert!(TargetRect::new(f32::INFINITY, 100.0).validate().is_err());
        assert!(TargetRect::new(100.0, f32::NAN).validate().is_err());
        assert!(TargetRect::new(100.0, 0.0).validate().is_ok());

        let rect = TargetRect::new(100.0, 100.0);
        assert_eq!(rect.max_height(2.0).unwrap(), 200.0);
        assert!(rect.max_height(f32::MAX).is_err());
    }

    #[test]
    fn serialises_with_kind_tag() {
        let batch = GeometryBatch {
            primitives: Primitives::Lines(Vec::new()),
            paint: paint(),
        };
        let json = serde_json::to_value(&batch).unwrap();
        assert_eq!(json["primitives"]["kind"], "lines");
        assert_eq!(json["paint"]["color"]["a"], 200);
    }
}
