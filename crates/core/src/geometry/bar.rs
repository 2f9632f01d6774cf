use crate::{
    config::{Anchor, RenderConfig},
    render::Renderer,
    spectrum::{FrequencySnapshot, MagnitudeSampler},
    Result, VisualiserError,
};

use super::{GeometryBatch, LineSegment, Paint, Primitives, TargetRect, STROKE_RATIO};

/// Height given to silent columns, as a fraction of the column width.
const SILENT_HEIGHT_RATIO: f32 = 0.1;

/// Renders each column as one vertical stroke, histogram style.
///
/// Endpoints are written into a flat `x0, y0, x1, y1` buffer that is kept
/// between frames. Only the first `4 * columns` entries of a frame are read
/// back, and the buffer is zeroed whenever the requested column count
/// changes.
#[derive(Debug, Default)]
pub struct BarGeometryBuilder {
    points: Vec<f32>,
    column_count: Option<usize>,
}

impl BarGeometryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroes the retained endpoint buffer.
    pub fn reset(&mut self) {
        self.points.iter_mut().for_each(|point| *point = 0.0);
    }

    pub fn build(
        &mut self,
        snapshot: FrequencySnapshot<'_>,
        config: &RenderConfig,
        rect: TargetRect,
    ) -> Result<GeometryBatch> {
        if self.column_count != Some(config.column_count()) {
            self.reset();
            self.column_count = Some(config.column_count());
        }

        rect.validate()?;
        let max_height = rect.max_height(config.scale())?;
        let spectrum = MagnitudeSampler::sample(snapshot, config.column_count())?;
        let columns = spectrum.columns();
        let column_width = rect.column_width(columns);

        if self.points.len() < columns * 4 {
            self.points.resize(columns * 4, 0.0);
        }

        for i in 0..columns {
            let x = i as f32 * column_width + column_width / 2.0;
            let mut column_height = spectrum.column_height(i, max_height);
            if column_height == 0.0 {
                column_height = column_width * SILENT_HEIGHT_RATIO;
            }

            let (y0, y1) = match config.anchor() {
                Anchor::Top => (0.0, column_height),
                Anchor::Bottom => (rect.height, rect.height - column_height),
                Anchor::Middle => (
                    rect.height / 2.0 + column_height / 2.0,
                    rect.height / 2.0 - column_height / 2.0,
                ),
                anchor @ Anchor::Unsupported => {
                    return Err(VisualiserError::UnsupportedAnchor(anchor));
                }
            };

            self.points[i * 4..i * 4 + 4].copy_from_slice(&[x, y0, x, y1]);
        }

        let lines = self.points[..columns * 4]
            .chunks_exact(4)
            .map(|p| LineSegment {
                x0: p[0],
                y0: p[1],
                x1: p[2],
                y1: p[3],
            })
            .collect();

        Ok(GeometryBatch {
            primitives: Primitives::Lines(lines),
            paint: Paint::from_style(config.style(), column_width * STROKE_RATIO),
        })
    }
}

impl Renderer for BarGeometryBuilder {
    fn name(&self) -> &'static str {
        "bar"
    }

    fn on_frequency_data(
        &mut self,
        snapshot: FrequencySnapshot<'_>,
        config: &RenderConfig,
        rect: TargetRect,
    ) -> Result<Option<GeometryBatch>> {
        self.build(snapshot, config, rect).map(Some)
    }

    fn reset(&mut self) {
        BarGeometryBuilder::reset(self);
    }
}
