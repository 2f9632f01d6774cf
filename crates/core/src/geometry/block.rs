use crate::{
    config::{Anchor, RenderConfig},
    render::Renderer,
    spectrum::{FrequencySnapshot, MagnitudeSampler},
    Result, VisualiserError,
};

use super::{BlockRect, GeometryBatch, Paint, Primitives, TargetRect, PADDING_RATIO, STROKE_RATIO};

/// Upper bound on blocks in one column. Columns scaled far past the target
/// keep their height but are cut into taller blocks.
pub const MAX_BLOCKS_PER_COLUMN: usize = 4096;

/// Renders each column as a stack of padded blocks, LED meter style.
///
/// A column is cut into `max(1, floor(height / column_width))` slices so the
/// blocks stay roughly square whatever the scale. Every block is inset by a
/// tenth of the column width on all four sides.
#[derive(Debug, Default)]
pub struct BlockGeometryBuilder;

/// How a single column is divided into blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockStack {
    pub draw_count: usize,
    pub pixel_height: f32,
}

impl BlockStack {
    pub fn new(column_height: f32, column_width: f32) -> Self {
        let draw_count = ((column_height / column_width) as usize).clamp(1, MAX_BLOCKS_PER_COLUMN);
        Self {
            draw_count,
            pixel_height: column_height / draw_count as f32,
        }
    }
}

impl BlockGeometryBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(
        &self,
        snapshot: FrequencySnapshot<'_>,
        config: &RenderConfig,
        rect: TargetRect,
    ) -> Result<GeometryBatch> {
        rect.validate()?;
        let max_height = rect.max_height(config.scale())?;
        let spectrum = MagnitudeSampler::sample(snapshot, config.column_count())?;
        let columns = spectrum.columns();
        let column_width = rect.column_width(columns);
        let padding = column_width * PADDING_RATIO;

        let mut blocks = Vec::with_capacity(columns);
        for i in 0..columns {
            let column_height = spectrum.column_height(i, max_height);
            let left = i as f32 * column_width + padding;
            let right = (i + 1) as f32 * column_width - padding;
            let stack = BlockStack::new(column_height, column_width);
            let p = stack.pixel_height;

            for j in 0..stack.draw_count {
                let j = j as f32;
                let (top, bottom) = match config.anchor() {
                    Anchor::Top => (p * j + padding, p * (j + 1.0) - padding),
                    Anchor::Bottom => (
                        rect.height - p * (j + 1.0) + padding,
                        rect.height - p * j - padding,
                    ),
                    Anchor::Middle => {
                        let base = rect.height / 2.0 - column_height / 2.0;
                        (base + p * j + padding, base + p * (j + 1.0) - padding)
                    }
                    anchor @ Anchor::Unsupported => {
                        return Err(VisualiserError::UnsupportedAnchor(anchor));
                    }
                };
                blocks.push(BlockRect {
                    left,
                    top,
                    right,
                    bottom,
                });
            }
        }

        Ok(GeometryBatch {
            primitives: Primitives::Blocks(blocks),
            paint: Paint::from_style(config.style(), column_width * STROKE_RATIO),
        })
    }
}

impl Renderer for BlockGeometryBuilder {
    fn name(&self) -> &'static str {
        "block"
    }

    fn on_frequency_data(
        &mut self,
        snapshot: FrequencySnapshot<'_>,
        config: &RenderConfig,
        rect: TargetRect,
    ) -> Result<Option<GeometryBatch>> {
        self.build(snapshot, config, rect).map(Some)
    }
}
