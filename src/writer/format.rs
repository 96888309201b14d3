use rust_xlsxwriter::{
    Color, Format, FormatAlign, FormatBorder, FormatDiagonalBorder, FormatPattern, FormatScript,
    FormatUnderline,
};

use crate::model::StyleBundle;
use crate::model::style::{
    Alignment, Border, BorderEdge, BorderStyle, ColorRef, Fill, FillKind, Font, FontScript,
    HorizontalAlign, NumberFormat, Underline, VerticalAlign,
};

/// Number format given to date-time values whose style does not set one.
pub const DEFAULT_DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// The legacy 64-color palette, indexed by `indexed` color number.
const INDEXED_COLORS: [u32; 64] = [
    0x000000, 0xFFFFFF, 0xFF0000, 0x00FF00, 0x0000FF, 0xFFFF00, 0xFF00FF, 0x00FFFF, // 0-7
    0x000000, 0xFFFFFF, 0xFF0000, 0x00FF00, 0x0000FF, 0xFFFF00, 0xFF00FF, 0x00FFFF, // 8-15
    0x800000, 0x008000, 0x000080, 0x808000, 0x800080, 0x008080, 0xC0C0C0, 0x808080, // 16-23
    0x9999FF, 0x993366, 0xFFFFCC, 0xCCFFFF, 0x660066, 0xFF8080, 0x0066CC, 0xCCCCFF, // 24-31
    0x000080, 0xFF00FF, 0xFFFF00, 0x00FFFF, 0x800080, 0x800000, 0x008080, 0x0000FF, // 32-39
    0x00CCFF, 0xCCFFFF, 0xCCFFCC, 0xFFFF99, 0x99CCFF, 0xFF99CC, 0xCC99FF, 0xFFCC99, // 40-47
    0x3366FF, 0x33CCCC, 0x99CC00, 0xFFCC00, 0xFF9900, 0xFF6600, 0x666699, 0x969696, // 48-55
    0x003366, 0x339966, 0x003300, 0x333300, 0x993300, 0x993366, 0x333399, 0x333333, // 56-63
];

pub(crate) fn to_color(color: ColorRef) -> Option<Color> {
    match color {
        ColorRef::Rgb(rgb) => Some(Color::RGB(rgb)),
        // Tints are not carried over, so every theme color is written at its base shade.
        ColorRef::Theme(index) if index <= 9 => Some(Color::Theme(index, 0)),
        ColorRef::Theme(_) => None,
        ColorRef::Indexed(index) => INDEXED_COLORS.get(index as usize).map(|rgb| Color::RGB(*rgb)),
    }
}

/// Builds the writer format for a style bundle.
pub(crate) fn to_format(style: &StyleBundle) -> Format {
    let mut format = Format::new();
    format = apply_font(format, &style.font);
    format = apply_fill(format, &style.fill);
    format = apply_border(format, &style.border);
    format = apply_alignment(format, &style.alignment);

    match &style.number_format {
        NumberFormat::Builtin(0) => {}
        NumberFormat::Builtin(id) => {
            if let Ok(id) = u8::try_from(*id) {
                format = format.set_num_format_index(id);
            }
        }
        NumberFormat::Custom(code) => format = format.set_num_format(code),
    }

    if !style.protection.locked {
        format = format.set_unlocked();
    }
    if style.protection.hidden {
        format = format.set_hidden();
    }

    format
}

fn apply_font(mut format: Format, font: &Font) -> Format {
    if let Some(name) = &font.name {
        format = format.set_font_name(name);
    }
    if let Some(size) = font.size {
        format = format.set_font_size(size);
    }
    if font.bold {
        format = format.set_bold();
    }
    if font.italic {
        format = format.set_italic();
    }
    if font.strikethrough {
        format = format.set_font_strikethrough();
    }
    if let Some(color) = font.color.and_then(to_color) {
        format = format.set_font_color(color);
    }

    let underline = match font.underline {
        Underline::None => None,
        Underline::Single => Some(FormatUnderline::Single),
        Underline::Double => Some(FormatUnderline::Double),
        Underline::SingleAccounting => Some(FormatUnderline::SingleAccounting),
        Underline::DoubleAccounting => Some(FormatUnderline::DoubleAccounting),
    };
    if let Some(underline) = underline {
        format = format.set_underline(underline);
    }

    match font.script {
        FontScript::Baseline => format,
        FontScript::Superscript => format.set_font_script(FormatScript::Superscript),
        FontScript::Subscript => format.set_font_script(FormatScript::Subscript),
    }
}

fn apply_fill(mut format: Format, fill: &Fill) -> Format {
    let pattern = match &fill.kind {
        FillKind::None | FillKind::Gradient => return format,
        FillKind::Solid => FormatPattern::Solid,
        FillKind::Pattern(name) => match pattern_from_ooxml(name) {
            Some(pattern) => pattern,
            None => return format,
        },
    };

    format = format.set_pattern(pattern);
    if let Some(color) = fill.foreground.and_then(to_color) {
        format = format.set_foreground_color(color);
    }
    if let Some(color) = fill.background.and_then(to_color) {
        format = format.set_background_color(color);
    }
    format
}

fn pattern_from_ooxml(name: &str) -> Option<FormatPattern> {
    let pattern = match name {
        "mediumGray" => FormatPattern::MediumGray,
        "darkGray" => FormatPattern::DarkGray,
        "lightGray" => FormatPattern::LightGray,
        "darkHorizontal" => FormatPattern::DarkHorizontal,
        "darkVertical" => FormatPattern::DarkVertical,
        "darkDown" => FormatPattern::DarkDown,
        "darkUp" => FormatPattern::DarkUp,
        "darkGrid" => FormatPattern::DarkGrid,
        "darkTrellis" => FormatPattern::DarkTrellis,
        "lightHorizontal" => FormatPattern::LightHorizontal,
        "lightVertical" => FormatPattern::LightVertical,
        "lightDown" => FormatPattern::LightDown,
        "lightUp" => FormatPattern::LightUp,
        "lightGrid" => FormatPattern::LightGrid,
        "lightTrellis" => FormatPattern::LightTrellis,
        "gray125" => FormatPattern::Gray125,
        "gray0625" => FormatPattern::Gray0625,
        _ => return None,
    };
    Some(pattern)
}

fn border_style(style: BorderStyle) -> FormatBorder {
    match style {
        BorderStyle::None => FormatBorder::None,
        BorderStyle::Thin => FormatBorder::Thin,
        BorderStyle::Medium => FormatBorder::Medium,
        BorderStyle::Dashed => FormatBorder::Dashed,
        BorderStyle::Dotted => FormatBorder::Dotted,
        BorderStyle::Thick => FormatBorder::Thick,
        BorderStyle::Double => FormatBorder::Double,
        BorderStyle::Hair => FormatBorder::Hair,
        BorderStyle::MediumDashed => FormatBorder::MediumDashed,
        BorderStyle::DashDot => FormatBorder::DashDot,
        BorderStyle::MediumDashDot => FormatBorder::MediumDashDot,
        BorderStyle::DashDotDot => FormatBorder::DashDotDot,
        BorderStyle::MediumDashDotDot => FormatBorder::MediumDashDotDot,
        BorderStyle::SlantDashDot => FormatBorder::SlantDashDot,
    }
}

fn apply_border(mut format: Format, border: &Border) -> Format {
    let edge = |edge: &BorderEdge| {
        edge.is_visible()
            .then(|| (border_style(edge.style), edge.color.and_then(to_color)))
    };

    if let Some((style, color)) = edge(&border.left) {
        format = format.set_border_left(style);
        if let Some(color) = color {
            format = format.set_border_left_color(color);
        }
    }
    if let Some((style, color)) = edge(&border.right) {
        format = format.set_border_right(style);
        if let Some(color) = color {
            format = format.set_border_right_color(color);
        }
    }
    if let Some((style, color)) = edge(&border.top) {
        format = format.set_border_top(style);
        if let Some(color) = color {
            format = format.set_border_top_color(color);
        }
    }
    if let Some((style, color)) = edge(&border.bottom) {
        format = format.set_border_bottom(style);
        if let Some(color) = color {
            format = format.set_border_bottom_color(color);
        }
    }

    let diagonal = match (border.diagonal_up, border.diagonal_down) {
        (true, true) => Some(FormatDiagonalBorder::BorderUpDown),
        (true, false) => Some(FormatDiagonalBorder::BorderUp),
        (false, true) => Some(FormatDiagonalBorder::BorderDown),
        (false, false) => None,
    };
    if let (Some(kind), Some((style, color))) = (diagonal, edge(&border.diagonal)) {
        format = format.set_border_diagonal(style).set_border_diagonal_type(kind);
        if let Some(color) = color {
            format = format.set_border_diagonal_color(color);
        }
    }

    format
}

fn apply_alignment(mut format: Format, alignment: &Alignment) -> Format {
    let horizontal = match alignment.horizontal {
        HorizontalAlign::General => None,
        HorizontalAlign::Left => Some(FormatAlign::Left),
        HorizontalAlign::Center => Some(FormatAlign::Center),
        HorizontalAlign::Right => Some(FormatAlign::Right),
        HorizontalAlign::Fill => Some(FormatAlign::Fill),
        HorizontalAlign::Justify => Some(FormatAlign::Justify),
        HorizontalAlign::CenterContinuous => Some(FormatAlign::CenterAcross),
        HorizontalAlign::Distributed => Some(FormatAlign::Distributed),
    };
    if let Some(align) = horizontal {
        format = format.set_align(align);
    }

    let vertical = match alignment.vertical {
        VerticalAlign::Bottom => None,
        VerticalAlign::Top => Some(FormatAlign::Top),
        VerticalAlign::Center => Some(FormatAlign::VerticalCenter),
        VerticalAlign::Justify => Some(FormatAlign::VerticalJustify),
        VerticalAlign::Distributed => Some(FormatAlign::VerticalDistributed),
    };
    if let Some(align) = vertical {
        format = format.set_align(align);
    }

    if alignment.wrap_text {
        format = format.set_text_wrap();
    }
    if alignment.shrink_to_fit {
        format = format.set_shrink();
    }
    if alignment.indent > 0 {
        format = format.set_indent(alignment.indent);
    }
    if alignment.rotation != 0 {
        format = format.set_rotation(alignment.rotation);
    }
    format
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_palette_and_theme_colors() {
        assert_eq!(to_color(ColorRef::Indexed(10)), Some(Color::RGB(0xFF0000)));
        assert_eq!(to_color(ColorRef::Indexed(22)), Some(Color::RGB(0xC0C0C0)));
        assert_eq!(to_color(ColorRef::Theme(4)), Some(Color::Theme(4, 0)));
        assert_eq!(to_color(ColorRef::Theme(11)), None);
        assert_eq!(to_color(ColorRef::Rgb(0x123456)), Some(Color::RGB(0x123456)));
    }

    #[test]
    fn default_style_builds_default_format() {
        assert_eq!(to_format(&StyleBundle::default()), Format::new());
    }

    #[test]
    fn solid_fill_sets_pattern_and_colors() {
        let mut style = StyleBundle::default();
        style.fill = Fill {
            kind: FillKind::Solid,
            foreground: Some(ColorRef::Rgb(0xFFFF00)),
            background: None,
        };
        style.font.bold = true;

        let expected = Format::new()
            .set_bold()
            .set_pattern(FormatPattern::Solid)
            .set_foreground_color(Color::RGB(0xFFFF00));
        assert_eq!(to_format(&style), expected);
    }
}
