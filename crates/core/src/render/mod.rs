use std::fmt;

use serde::Serialize;

use crate::{
    audio::CapturedFrame,
    config::{check_fade_alpha, Anchor, AppConfig, RenderConfig, Shape, Style, ViewConfig},
    geometry::{BarGeometryBuilder, BlockGeometryBuilder, GeometryBatch, TargetRect},
    spectrum::{FrequencySnapshot, WaveformSnapshot},
    Result,
};

/// A strategy that turns one kind of captured data into geometry.
///
/// Providers may deliver waveform data, FFT data or both in a frame; each
/// handler is called once per kind present. Renderers that only understand
/// one kind keep the default no-op for the other.
pub trait Renderer {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn on_time_data(
        &mut self,
        _snapshot: WaveformSnapshot<'_>,
        _config: &RenderConfig,
        _rect: TargetRect,
    ) -> Result<Option<GeometryBatch>> {
        Ok(None)
    }

    fn on_frequency_data(
        &mut self,
        _snapshot: FrequencySnapshot<'_>,
        _config: &RenderConfig,
        _rect: TargetRect,
    ) -> Result<Option<GeometryBatch>> {
        Ok(None)
    }

    /// Drops any per-column state kept between frames.
    fn reset(&mut self) {}
}

/// Geometry for one frame, ready for the display surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameOutput {
    pub sequence: u64,
    pub batches: Vec<GeometryBatch>,
    /// Alpha the surface should fade the previous frame with.
    pub fade_alpha: f32,
    /// Set when this frame's geometry was dropped and `batches` repeats the
    /// last frame that rendered cleanly.
    pub retained: bool,
}

/// Owns the render configuration and the active renderers, and dispatches
/// captured frames to them.
///
/// All mutation goes through `&mut self` on the thread that draws; the
/// configuration is handed to renderers by reference for the duration of a
/// single call.
pub struct Visualizer {
    config: RenderConfig,
    view: ViewConfig,
    renderers: Vec<Box<dyn Renderer>>,
    previous: Vec<GeometryBatch>,
}

impl Visualizer {
    /// Creates a visualiser drawing with the renderer selected by
    /// `config.view.shape`.
    pub fn new(config: AppConfig) -> Self {
        let mut visualizer = Self {
            config: config.render,
            view: config.view,
            renderers: Vec::new(),
            previous: Vec::new(),
        };
        visualizer.set_shape(config.view.shape);
        visualizer
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn view(&self) -> &ViewConfig {
        &self.view
    }

    pub fn renderer_names(&self) -> Vec<&'static str> {
        self.renderers.iter().map(|renderer| renderer.name()).collect()
    }

    pub fn add_renderer(&mut self, renderer: Box<dyn Renderer>) {
        tracing::debug!(renderer = renderer.name(), "adding renderer");
        self.renderers.push(renderer);
    }

    pub fn clear_renderers(&mut self) {
        self.renderers.clear();
    }

    /// Replaces the active renderers with the one drawing `shape`.
    pub fn set_shape(&mut self, shape: Shape) {
        self.clear_renderers();
        self.view.shape = shape;
        match shape {
            Shape::Bar => self.add_renderer(Box::new(BarGeometryBuilder::new())),
            Shape::Block => self.add_renderer(Box::new(BlockGeometryBuilder::new())),
        }
    }

    /// Changes the requested column count and clears per-column state held by
    /// every renderer.
    pub fn set_column_count(&mut self, column_count: usize) -> Result<()> {
        self.config.set_column_count(column_count)?;
        for renderer in &mut self.renderers {
            renderer.reset();
        }
        tracing::debug!(column_count, "column count changed");
        Ok(())
    }

    pub fn set_anchor(&mut self, anchor: Anchor) {
        self.config.set_anchor(anchor);
        tracing::debug!(?anchor, "anchor changed");
    }

    pub fn set_scale(&mut self, scale: f32) -> Result<()> {
        self.config.set_scale(scale)?;
        tracing::debug!(scale, "scale changed");
        Ok(())
    }

    pub fn set_style(&mut self, style: Style) {
        self.config.set_style(style);
    }

    pub fn set_fade_alpha(&mut self, fade_alpha: f32) -> Result<()> {
        check_fade_alpha(fade_alpha)?;
        self.view.fade_alpha = fade_alpha;
        Ok(())
    }

    /// Renders one captured frame.
    ///
    /// Frames whose layout is unsupported are dropped whole; the previous
    /// frame's geometry is returned with [`FrameOutput::retained`] set.
    /// Malformed snapshots are reported as errors.
    pub fn render(&mut self, frame: &CapturedFrame, rect: TargetRect) -> Result<FrameOutput> {
        let mut batches = Vec::with_capacity(self.renderers.len());
        match dispatch(&mut self.renderers, &self.config, frame, rect, &mut batches) {
            Ok(()) => {
                self.previous.clone_from(&batches);
                Ok(FrameOutput {
                    sequence: frame.sequence,
                    batches,
                    fade_alpha: self.view.fade_alpha,
                    retained: false,
                })
            }
            Err(err) if err.is_frame_local() => {
                tracing::warn!(sequence = frame.sequence, %err, "dropping frame geometry");
                Ok(FrameOutput {
                    sequence: frame.sequence,
                    batches: self.previous.clone(),
                    fade_alpha: self.view.fade_alpha,
                    retained: true,
                })
            }
            Err(err) => Err(err),
        }
    }
}

fn dispatch(
    renderers: &mut [Box<dyn Renderer>],
    config: &RenderConfig,
    frame: &CapturedFrame,
    rect: TargetRect,
    batches: &mut Vec<GeometryBatch>,
) -> Result<()> {
    if let Some(samples) = frame.waveform.as_deref() {
        let snapshot = WaveformSnapshot::new(samples);
        for renderer in renderers.iter_mut() {
            batches.extend(renderer.on_time_data(snapshot, config, rect)?);
        }
    }

    if let Some(bytes) = frame.fft.as_deref() {
        let snapshot = FrequencySnapshot::new(bytes)?;
        for renderer in renderers.iter_mut() {
            batches.extend(renderer.on_frequency_data(snapshot, config, rect)?);
        }
    }

    Ok(())
}

impl fmt::Debug for Visualizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Visualizer")
            .field("config", &self.config)
            .field("view", &self.view)
            .field("renderers", &self.renderer_names())
            .field("previous", &self.previous.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::{geometry::Primitives, VisualiserError};

    #[derive(Debug, Default)]
    struct Calls {
        time: usize,
        frequency: usize,
        resets: usize,
    }

    /// Records how often each handler runs.
    #[derive(Default)]
    struct CountingRenderer {
        calls: Rc<RefCell<Calls>>,
    }

    impl Renderer for CountingRenderer {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn on_time_data(
            &mut self,
            _snapshot: WaveformSnapshot<'_>,
            _config: &RenderConfig,
            _rect: TargetRect,
        ) -> Result<Option<GeometryBatch>> {
            self.calls.borrow_mut().time += 1;
            Ok(None)
        }

        fn on_frequency_data(
            &mut self,
            _snapshot: FrequencySnapshot<'_>,
            _config: &RenderConfig,
            _rect: TargetRect,
        ) -> Result<Option<GeometryBatch>> {
            self.calls.borrow_mut().frequency += 1;
            Ok(None)
        }

        fn reset(&mut self) {
            self.calls.borrow_mut().resets += 1;
        }
    }

    fn counting_visualizer() -> (Visualizer, Rc<RefCell<Calls>>) {
        let renderer = CountingRenderer::default();
        let calls = renderer.calls.clone();
        let mut visualizer = Visualizer::new(AppConfig::default());
        visualizer.clear_renderers();
        visualizer.add_renderer(Box::new(renderer));
        (visualizer, calls)
    }

    fn frame(sequence: u64, fft: Option<Vec<i8>>, waveform: Option<Vec<u8>>) -> CapturedFrame {
        CapturedFrame {
            sequence,
            waveform,
            fft,
        }
    }

    fn rect() -> TargetRect {
        TargetRect::new(128.0, 64.0)
    }

    #[test]
    fn invokes_each_handler_for_delivered_kinds() {
        let (mut visualizer, calls) = counting_visualizer();

        visualizer
            .render(&frame(0, Some(vec![0; 16]), Some(vec![128; 16])), rect())
            .unwrap();
        visualizer
            .render(&frame(1, Some(vec![0; 16]), None), rect())
            .unwrap();
        visualizer
            .render(&frame(2, None, Some(vec![128; 16])), rect())
            .unwrap();
        visualizer.render(&frame(3, None, None), rect()).unwrap();

        let calls = calls.borrow();
        assert_eq!(calls.time, 2);
        assert_eq!(calls.frequency, 2);
    }

    #[test]
    fn renders_bars_by_default() {
        let mut visualizer = Visualizer::new(AppConfig::default());
        assert_eq!(visualizer.renderer_names(), vec!["bar"]);

        let output = visualizer
            .render(&frame(4, Some(vec![0; 256]), Some(vec![128; 256])), rect())
            .unwrap();
        assert_eq!(output.sequence, 4);
        assert!(!output.retained);
        assert_eq!(output.fade_alpha, 0.5);
        assert_eq!(output.batches.len(), 1);
        assert_eq!(output.batches[0].primitives.len(), 128);
    }

    #[test]
    fn switching_shape_swaps_renderer() {
        let mut visualizer = Visualizer::new(AppConfig::default());
        visualizer.set_shape(Shape::Block);
        assert_eq!(visualizer.renderer_names(), vec!["block"]);
        assert_eq!(visualizer.view().shape, Shape::Block);

        let output = visualizer
            .render(&frame(0, Some(vec![0; 64]), None), rect())
            .unwrap();
        assert!(matches!(output.batches[0].primitives, Primitives::Blocks(_)));
    }

    #[test]
    fn waveform_only_frames_produce_no_geometry() {
        let mut visualizer = Visualizer::new(AppConfig::default());
        let output = visualizer
            .render(&frame(0, None, Some(vec![128; 64])), rect())
            .unwrap();
        assert!(output.batches.is_empty());
        assert!(!output.retained);
    }

    #[test]
    fn unsupported_anchor_retains_previous_geometry() {
        let mut visualizer = Visualizer::new(AppConfig::default());
        let good = visualizer
            .render(&frame(0, Some(vec![20; 64]), None), rect())
            .unwrap();

        visualizer.set_anchor(Anchor::Unsupported);
        let dropped = visualizer
            .render(&frame(1, Some(vec![90; 64]), None), rect())
            .unwrap();
        assert!(dropped.retained);
        assert_eq!(dropped.sequence, 1);
        assert_eq!(dropped.batches, good.batches);

        visualizer.set_anchor(Anchor::Top);
        let recovered = visualizer
            .render(&frame(2, Some(vec![90; 64]), None), rect())
            .unwrap();
        assert!(!recovered.retained);
        assert_ne!(recovered.batches, good.batches);
    }

    #[test]
    fn malformed_snapshots_are_reported() {
        let mut visualizer = Visualizer::new(AppConfig::default());
        let err = visualizer
            .render(&frame(0, Some(vec![1, 2, 3]), None), rect())
            .unwrap_err();
        assert!(matches!(err, VisualiserError::InvalidInput(_)));
    }

    #[test]
    fn column_count_changes_reset_renderers() {
        let (mut visualizer, calls) = counting_visualizer();

        visualizer.set_column_count(32).unwrap();
        assert_eq!(visualizer.config().column_count(), 32);
        assert_eq!(calls.borrow().resets, 1);

        assert!(visualizer.set_column_count(0).is_err());
        assert_eq!(visualizer.config().column_count(), 32);
        assert_eq!(calls.borrow().resets, 1);

        visualizer.set_anchor(Anchor::Bottom);
        assert_eq!(calls.borrow().resets, 1);
    }

    #[test]
    fn rendering_does_not_write_clamp_back() {
        let mut visualizer = Visualizer::new(AppConfig::default());
        visualizer.set_column_count(512).unwrap();

        let small = visualizer
            .render(&frame(0, Some(vec![0; 64]), None), rect())
            .unwrap();
        assert_eq!(small.batches[0].primitives.len(), 32);
        assert_eq!(visualizer.config().column_count(), 512);

        let large = visualizer
            .render(&frame(1, Some(vec![0; 1024]), None), rect())
            .unwrap();
        assert_eq!(large.batches[0].primitives.len(), 512);
    }

    #[test]
    fn validates_view_setters() {
        let mut visualizer = Visualizer::new(AppConfig::default());
        assert!(visualizer.set_fade_alpha(-0.1).is_err());
        visualizer.set_fade_alpha(0.9).unwrap();
        assert_eq!(visualizer.view().fade_alpha, 0.9);
        assert!(visualizer.set_scale(-1.0).is_err());
    }
}
