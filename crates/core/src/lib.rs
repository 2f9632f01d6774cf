//! Core library for the Spectrum Visualiser.
//!
//! The crate turns per-frame FFT snapshots into drawable geometry. Each module
//! owns one step of that path: sampling magnitudes out of a snapshot
//! (`spectrum`), laying them out as bars or block stacks (`geometry`),
//! dispatching captured frames to the active renderers (`render`) and handing
//! frames over from a capture thread (`audio`). Capturing audio and computing
//! the FFT are left to the host.

pub mod audio;
pub mod config;
pub mod error;
pub mod geometry;
pub mod render;
pub mod spectrum;

pub use audio::{snapshot_handoff, CapturedFrame, SnapshotReader, SnapshotWriter};
pub use config::{Anchor, AppConfig, FillMode, RenderConfig, Rgba, Shape, Style, ViewConfig};
pub use error::{Result, VisualiserError};
pub use geometry::{
    BarGeometryBuilder, BlockGeometryBuilder, BlockRect, GeometryBatch, LineSegment, Paint,
    Primitives, TargetRect,
};
pub use render::{FrameOutput, Renderer, Visualizer};
pub use spectrum::{FrequencySnapshot, MagnitudeSampler, SampledSpectrum, WaveformSnapshot};
