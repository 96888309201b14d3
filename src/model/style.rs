//! Cell style bundle.
//!
//! Each attribute group is its own owned value type, so copying a bundle from a
//! source workbook into the merged one never shares state between the two.

/// A color as stored in the package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorRef {
    /// `0xRRGGBB`; the alpha byte of the stored ARGB value is dropped.
    Rgb(u32),
    /// Index into the workbook theme palette.
    Theme(u8),
    /// Index into the legacy 64-entry palette.
    Indexed(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Underline {
    #[default]
    None,
    Single,
    Double,
    SingleAccounting,
    DoubleAccounting,
}

impl Underline {
    pub fn from_ooxml(value: &str) -> Self {
        match value {
            "double" => Underline::Double,
            "singleAccounting" => Underline::SingleAccounting,
            "doubleAccounting" => Underline::DoubleAccounting,
            "none" => Underline::None,
            _ => Underline::Single,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontScript {
    #[default]
    Baseline,
    Superscript,
    Subscript,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Font {
    pub name: Option<String>,
    pub size: Option<f64>,
    pub bold: bool,
    pub italic: bool,
    pub underline: Underline,
    pub strikethrough: bool,
    pub color: Option<ColorRef>,
    pub script: FontScript,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FillKind {
    #[default]
    None,
    Solid,
    /// Any other `patternType`, e.g. `gray125` or `darkGrid`.
    Pattern(String),
    Gradient,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fill {
    pub kind: FillKind,
    pub foreground: Option<ColorRef>,
    pub background: Option<ColorRef>,
}

impl Fill {
    pub fn is_solid(&self) -> bool {
        self.kind == FillKind::Solid
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    #[default]
    None,
    Thin,
    Medium,
    Dashed,
    Dotted,
    Thick,
    Double,
    Hair,
    MediumDashed,
    DashDot,
    MediumDashDot,
    DashDotDot,
    MediumDashDotDot,
    SlantDashDot,
}

impl BorderStyle {
    pub fn from_ooxml(value: &str) -> Self {
        match value {
            "thin" => BorderStyle::Thin,
            "medium" => BorderStyle::Medium,
            "dashed" => BorderStyle::Dashed,
            "dotted" => BorderStyle::Dotted,
            "thick" => BorderStyle::Thick,
            "double" => BorderStyle::Double,
            "hair" => BorderStyle::Hair,
            "mediumDashed" => BorderStyle::MediumDashed,
            "dashDot" => BorderStyle::DashDot,
            "mediumDashDot" => BorderStyle::MediumDashDot,
            "dashDotDot" => BorderStyle::DashDotDot,
            "mediumDashDotDot" => BorderStyle::MediumDashDotDot,
            "slantDashDot" => BorderStyle::SlantDashDot,
            _ => BorderStyle::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BorderEdge {
    pub style: BorderStyle,
    pub color: Option<ColorRef>,
}

impl BorderEdge {
    pub fn is_visible(&self) -> bool {
        self.style != BorderStyle::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Border {
    pub left: BorderEdge,
    pub right: BorderEdge,
    pub top: BorderEdge,
    pub bottom: BorderEdge,
    pub diagonal: BorderEdge,
    pub diagonal_up: bool,
    pub diagonal_down: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HorizontalAlign {
    #[default]
    General,
    Left,
    Center,
    Right,
    Fill,
    Justify,
    CenterContinuous,
    Distributed,
}

impl HorizontalAlign {
    pub fn from_ooxml(value: &str) -> Self {
        match value {
            "left" => HorizontalAlign::Left,
            "center" => HorizontalAlign::Center,
            "right" => HorizontalAlign::Right,
            "fill" => HorizontalAlign::Fill,
            "justify" => HorizontalAlign::Justify,
            "centerContinuous" => HorizontalAlign::CenterContinuous,
            "distributed" => HorizontalAlign::Distributed,
            _ => HorizontalAlign::General,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalAlign {
    Top,
    Center,
    #[default]
    Bottom,
    Justify,
    Distributed,
}

impl VerticalAlign {
    pub fn from_ooxml(value: &str) -> Self {
        match value {
            "top" => VerticalAlign::Top,
            "center" => VerticalAlign::Center,
            "justify" => VerticalAlign::Justify,
            "distributed" => VerticalAlign::Distributed,
            _ => VerticalAlign::Bottom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Alignment {
    pub horizontal: HorizontalAlign,
    pub vertical: VerticalAlign,
    pub wrap_text: bool,
    pub shrink_to_fit: bool,
    pub indent: u8,
    /// Degrees in `-90..=90`, or `270` for stacked vertical text.
    pub rotation: i16,
}

impl Alignment {
    /// Converts a stored `textRotation` (0-180, 255 = stacked) into signed degrees.
    pub fn rotation_from_ooxml(value: u16) -> i16 {
        match value {
            0..=90 => value as i16,
            91..=180 => 90 - value as i16,
            255 => 270,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumberFormat {
    /// One of the format ids every spreadsheet application knows without a definition.
    Builtin(u16),
    Custom(String),
}

impl Default for NumberFormat {
    fn default() -> Self {
        NumberFormat::Builtin(0)
    }
}

impl NumberFormat {
    pub fn is_general(&self) -> bool {
        matches!(self, NumberFormat::Builtin(0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Protection {
    pub locked: bool,
    pub hidden: bool,
}

impl Default for Protection {
    fn default() -> Self {
        Self {
            locked: true,
            hidden: false,
        }
    }
}

/// Everything that determines how a single cell is rendered.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleBundle {
    pub font: Font,
    pub fill: Fill,
    pub border: Border,
    pub alignment: Alignment,
    pub number_format: NumberFormat,
    pub protection: Protection,
}

impl StyleBundle {
    /// Copies this style over `base`.
    ///
    /// Font, border, alignment, number format and protection always come from
    /// `self`. The fill only replaces the one in `base` when it is solid; any
    /// other fill leaves `base`'s fill in place.
    #[must_use]
    pub fn overlay(&self, base: Option<&StyleBundle>) -> StyleBundle {
        let fill = if self.fill.is_solid() {
            self.fill.clone()
        } else {
            base.map(|b| b.fill.clone()).unwrap_or_default()
        };

        StyleBundle {
            font: self.font.clone(),
            fill,
            border: self.border,
            alignment: self.alignment,
            number_format: self.number_format.clone(),
            protection: self.protection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(kind: FillKind, rgb: u32) -> StyleBundle {
        StyleBundle {
            fill: Fill {
                kind,
                foreground: Some(ColorRef::Rgb(rgb)),
                background: None,
            },
            ..StyleBundle::default()
        }
    }

    #[test]
    fn overlay_copies_solid_fill() {
        let source = filled(FillKind::Solid, 0xFF0000);
        let merged = source.overlay(None);
        assert_eq!(merged.fill.foreground, Some(ColorRef::Rgb(0xFF0000)));
    }

    #[test]
    fn overlay_keeps_base_fill_for_patterns() {
        let base = filled(FillKind::Solid, 0x00FF00);
        let mut source = filled(FillKind::Pattern("gray125".into()), 0xFF0000);
        source.font.bold = true;

        let merged = source.overlay(Some(&base));
        assert!(merged.font.bold);
        assert_eq!(merged.fill, base.fill);
        assert!(source.overlay(None).fill == Fill::default());
    }

    #[test]
    fn overlay_is_a_deep_copy() {
        let mut source = StyleBundle::default();
        source.font.name = Some("Arial".into());
        let mut copy = source.overlay(None);
        copy.font.name = Some("Courier".into());
        assert_eq!(source.font.name.as_deref(), Some("Arial"));
    }

    #[test]
    fn rotation_maps_downward_angles_to_negative_degrees() {
        assert_eq!(Alignment::rotation_from_ooxml(45), 45);
        assert_eq!(Alignment::rotation_from_ooxml(135), -45);
        assert_eq!(Alignment::rotation_from_ooxml(255), 270);
    }
}
