use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Result, VisualiserError};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

impl AppConfig {
    /// Parses a JSON document and validates every section.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.render.validate()?;
        self.view.validate()
    }
}

/// Where on the target rectangle a column is rooted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Top,
    Bottom,
    #[default]
    Middle,
    /// Anything the layout code does not know how to place. Rendering with
    /// this anchor drops the frame.
    #[serde(other)]
    Unsupported,
}

impl Anchor {
    /// Maps the integer position codes sent by button-driven control surfaces
    /// (0 top, 1 bottom, 2 middle).
    pub fn from_position(code: i32) -> Self {
        match code {
            0 => Self::Top,
            1 => Self::Bottom,
            2 => Self::Middle,
            _ => Self::Unsupported,
        }
    }
}

/// 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMode {
    #[default]
    Fill,
    Stroke,
}

/// Visual style the display surface paints geometry with. Stroke width is not
/// part of the style: the builders derive it from the column width each frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub color: Rgba,
    #[serde(default = "default_anti_alias")]
    pub anti_alias: bool,
    #[serde(default)]
    pub fill: FillMode,
}

fn default_anti_alias() -> bool {
    true
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: Rgba::new(181, 111, 233, 200),
            anti_alias: true,
            fill: FillMode::Fill,
        }
    }
}

/// Parameters both geometry builders read on every frame.
///
/// The requested column count is stored as given. Clamping it to what a
/// snapshot can support happens per frame inside the sampler and is never
/// written back here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    column_count: usize,
    #[serde(default)]
    anchor: Anchor,
    scale: f32,
    #[serde(default)]
    style: Style,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            column_count: 128,
            anchor: Anchor::Middle,
            scale: 2.0,
            style: Style::default(),
        }
    }
}

impl RenderConfig {
    pub fn new(column_count: usize, anchor: Anchor, scale: f32) -> Result<Self> {
        let config = Self {
            column_count,
            anchor,
            scale,
            style: Style::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn set_column_count(&mut self, column_count: usize) -> Result<()> {
        check_column_count(column_count)?;
        self.column_count = column_count;
        Ok(())
    }

    /// Any anchor is accepted here, including [`Anchor::Unsupported`]; the
    /// builders reject it when they lay out the next frame.
    pub fn set_anchor(&mut self, anchor: Anchor) {
        self.anchor = anchor;
    }

    pub fn set_scale(&mut self, scale: f32) -> Result<()> {
        check_scale(scale)?;
        self.scale = scale;
        Ok(())
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    pub fn validate(&self) -> Result<()> {
        check_column_count(self.column_count)?;
        check_scale(self.scale)
    }
}

fn check_column_count(column_count: usize) -> Result<()> {
    if column_count == 0 {
        return Err(VisualiserError::InvalidInput(
            "column count must be at least one",
        ));
    }
    Ok(())
}

fn check_scale(scale: f32) -> Result<()> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(VisualiserError::InvalidInput(
            "scale must be a positive, finite number",
        ));
    }
    Ok(())
}

/// Which geometry strategy the view draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    #[default]
    Bar,
    Block,
}

/// Settings owned by the hosting view rather than the builders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default)]
    pub shape: Shape,
    /// Alpha the surface fades the previous frame with, in `[0, 1]`.
    #[serde(default = "default_fade_alpha")]
    pub fade_alpha: f32,
}

fn default_fade_alpha() -> f32 {
    0.5
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            shape: Shape::Bar,
            fade_alpha: default_fade_alpha(),
        }
    }
}

impl ViewConfig {
    pub fn validate(&self) -> Result<()> {
        check_fade_alpha(self.fade_alpha)
    }
}

pub(crate) fn check_fade_alpha(alpha: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&alpha) {
        return Err(VisualiserError::InvalidInput(
            "fade alpha must lie within [0, 1]",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_demo_settings() {
        let config = AppConfig::default();
        assert_eq!(config.render.column_count(), 128);
        assert_eq!(config.render.anchor(), Anchor::Middle);
        assert_eq!(config.render.scale(), 2.0);
        assert_eq!(config.view.shape, Shape::Bar);
        assert_eq!(config.view.fade_alpha, 0.5);
    }

    #[test]
    fn maps_position_codes() {
        assert_eq!(Anchor::from_position(0), Anchor::Top);
        assert_eq!(Anchor::from_position(1), Anchor::Bottom);
        assert_eq!(Anchor::from_position(2), Anchor::Middle);
        assert_eq!(Anchor::from_position(7), Anchor::Unsupported);
    }

    #[test]
    fn setters_reject_out_of_range_values() {
        let mut config = RenderConfig::default();
        assert!(config.set_column_count(0).is_err());
        assert!(config.set_scale(0.0).is_err());
        assert!(config.set_scale(f32::NAN).is_err());
        assert_eq!(config, RenderConfig::default());

        config.set_column_count(64).unwrap();
        config.set_scale(0.5).unwrap();
        assert_eq!(config.column_count(), 64);
        assert_eq!(config.scale(), 0.5);
    }

    #[test]
    fn parses_json_with_partial_sections() {
        let json = r#"{
            "render": { "column_count": 32, "anchor": "top", "scale": 1.5 },
            "view": { "shape": "block", "fade_alpha": 0.25 }
        }"#;

        let config = AppConfig::from_json_str(json).unwrap();
        assert_eq!(config.render.column_count(), 32);
        assert_eq!(config.render.anchor(), Anchor::Top);
        assert_eq!(config.render.style(), &Style::default());
        assert_eq!(config.view.shape, Shape::Block);
    }

    #[test]
    fn view_section_fields_are_optional() {
        let config = AppConfig::from_json_str(r#"{ "view": { "shape": "block" } }"#).unwrap();
        assert_eq!(config.view.shape, Shape::Block);
        assert_eq!(config.view.fade_alpha, 0.5);

        let config = AppConfig::from_json_str(r#"{ "view": {} }"#).unwrap();
        assert_eq!(config.view, ViewConfig::default());
    }

    #[test]
    fn unknown_anchor_names_parse_as_unsupported() {
        let json = r#"{ "render": { "column_count": 8, "anchor": "left", "scale": 1.0 } }"#;
        let config = AppConfig::from_json_str(json).unwrap();
        assert_eq!(config.render.anchor(), Anchor::Unsupported);
    }

    #[test]
    fn rejects_invalid_documents() {
        let zero_columns = r#"{ "render": { "column_count": 0, "scale": 1.0 } }"#;
        assert!(matches!(
            AppConfig::from_json_str(zero_columns),
            Err(VisualiserError::InvalidInput(_))
        ));

        let bad_alpha = r#"{ "view": { "fade_alpha": 1.5 } }"#;
        assert!(AppConfig::from_json_str(bad_alpha).is_err());

        let err = AppConfig::from_json_str("not json").unwrap_err();
        assert!(matches!(err, VisualiserError::Config(_)));
    }

    #[test]
    fn round_trips_through_pretty_json() {
        let mut config = AppConfig::default();
        config.render.set_anchor(Anchor::Bottom);
        let json = config.to_json_pretty().unwrap();
        assert_eq!(AppConfig::from_json_str(&json).unwrap(), config);
    }
}
