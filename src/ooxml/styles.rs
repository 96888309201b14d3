use std::collections::HashMap;

use roxmltree::Node;

use crate::model::style::{
    Alignment, Border, BorderEdge, BorderStyle, ColorRef, Fill, FillKind, Font, FontScript,
    HorizontalAlign, NumberFormat, Protection, StyleBundle, Underline, VerticalAlign,
};
use crate::ooxml::PackageError;
use crate::ooxml::xml::{attr, attr_bool, child, child_val, children, flag, parse_xml};

/// Custom number formats start at this id; anything below is built in.
const FIRST_CUSTOM_NUM_FMT: u16 = 164;

/// The resolved `cellXfs` table of a workbook: one style bundle per style index.
#[derive(Debug, Clone, Default)]
pub(crate) struct Stylesheet {
    cell_styles: Vec<StyleBundle>,
}

impl Stylesheet {
    pub fn parse(part: &str, xml: &str) -> Result<Self, PackageError> {
        let doc = parse_xml(part, xml)?;
        let root = doc.root_element();

        let num_fmts: HashMap<u16, String> = child(root, "numFmts")
            .map(|node| {
                children(node, "numFmt")
                    .filter_map(|n| {
                        let id = attr(n, "numFmtId")?;
                        Some((id, n.attribute("formatCode")?.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let fonts: Vec<Font> = child(root, "fonts")
            .map(|node| children(node, "font").map(parse_font).collect())
            .unwrap_or_default();
        let fills: Vec<Fill> = child(root, "fills")
            .map(|node| children(node, "fill").map(parse_fill).collect())
            .unwrap_or_default();
        let borders: Vec<Border> = child(root, "borders")
            .map(|node| children(node, "border").map(parse_border).collect())
            .unwrap_or_default();

        let mut cell_styles = Vec::new();
        if let Some(xfs) = child(root, "cellXfs") {
            for xf in children(xfs, "xf") {
                let pick = |name: &str| attr::<usize>(xf, name).unwrap_or(0);

                let num_fmt_id = attr::<u16>(xf, "numFmtId").unwrap_or(0);
                let number_format = match num_fmts.get(&num_fmt_id) {
                    Some(code) => NumberFormat::Custom(code.clone()),
                    None if num_fmt_id < FIRST_CUSTOM_NUM_FMT => NumberFormat::Builtin(num_fmt_id),
                    None => NumberFormat::default(),
                };

                cell_styles.push(StyleBundle {
                    font: fonts.get(pick("fontId")).cloned().unwrap_or_default(),
                    fill: fills.get(pick("fillId")).cloned().unwrap_or_default(),
                    border: borders.get(pick("borderId")).copied().unwrap_or_default(),
                    alignment: child(xf, "alignment").map(parse_alignment).unwrap_or_default(),
                    number_format,
                    protection: child(xf, "protection").map(parse_protection).unwrap_or_default(),
                });
            }
        }

        Ok(Self { cell_styles })
    }

    /// The bundle for a cell's `s` index, `None` for the default style or an unknown index.
    pub fn cell_style(&self, index: usize) -> Option<&StyleBundle> {
        if index == 0 {
            return None;
        }
        self.cell_styles.get(index)
    }

    pub fn len(&self) -> usize {
        self.cell_styles.len()
    }
}

fn parse_color(node: Node<'_, '_>) -> Option<ColorRef> {
    if let Some(rgb) = node.attribute("rgb") {
        let hex = rgb.trim();
        return hex
            .get(hex.len().saturating_sub(6)..)
            .and_then(|rrggbb| u32::from_str_radix(rrggbb, 16).ok())
            .map(ColorRef::Rgb);
    }
    if let Some(theme) = attr::<u8>(node, "theme") {
        return Some(ColorRef::Theme(theme));
    }
    match attr::<u8>(node, "indexed") {
        // 64 and 65 are the system foreground/background.
        Some(index) if index < 64 => Some(ColorRef::Indexed(index)),
        _ => None,
    }
}

fn parse_font(node: Node<'_, '_>) -> Font {
    Font {
        name: child_val(node, "name")
            .or_else(|| child_val(node, "rFont"))
            .map(str::to_string),
        size: child_val(node, "sz").and_then(|v| v.trim().parse().ok()),
        bold: flag(node, "b"),
        italic: flag(node, "i"),
        underline: match child(node, "u") {
            Some(u) => Underline::from_ooxml(u.attribute("val").unwrap_or("single")),
            None => Underline::None,
        },
        strikethrough: flag(node, "strike"),
        color: child(node, "color").and_then(parse_color),
        script: match child_val(node, "vertAlign") {
            Some("superscript") => FontScript::Superscript,
            Some("subscript") => FontScript::Subscript,
            _ => FontScript::Baseline,
        },
    }
}

fn parse_fill(node: Node<'_, '_>) -> Fill {
    if child(node, "gradientFill").is_some() {
        return Fill {
            kind: FillKind::Gradient,
            ..Fill::default()
        };
    }

    let Some(pattern) = child(node, "patternFill") else {
        return Fill::default();
    };

    let kind = match pattern.attribute("patternType") {
        None | Some("none") => FillKind::None,
        Some("solid") => FillKind::Solid,
        Some(other) => FillKind::Pattern(other.to_string()),
    };

    Fill {
        kind,
        foreground: child(pattern, "fgColor").and_then(parse_color),
        background: child(pattern, "bgColor").and_then(parse_color),
    }
}

fn parse_edge(node: Option<Node<'_, '_>>) -> BorderEdge {
    let Some(node) = node else {
        return BorderEdge::default();
    };

    BorderEdge {
        style: node
            .attribute("style")
            .map(BorderStyle::from_ooxml)
            .unwrap_or_default(),
        color: child(node, "color").and_then(parse_color),
    }
}

fn parse_border(node: Node<'_, '_>) -> Border {
    Border {
        left: parse_edge(child(node, "left").or_else(|| child(node, "start"))),
        right: parse_edge(child(node, "right").or_else(|| child(node, "end"))),
        top: parse_edge(child(node, "top")),
        bottom: parse_edge(child(node, "bottom")),
        diagonal: parse_edge(child(node, "diagonal")),
        diagonal_up: attr_bool(node, "diagonalUp").unwrap_or(false),
        diagonal_down: attr_bool(node, "diagonalDown").unwrap_or(false),
    }
}

fn parse_alignment(node: Node<'_, '_>) -> Alignment {
    Alignment {
        horizontal: node
            .attribute("horizontal")
            .map(HorizontalAlign::from_ooxml)
            .unwrap_or_default(),
        vertical: node
            .attribute("vertical")
            .map(VerticalAlign::from_ooxml)
            .unwrap_or_default(),
        wrap_text: attr_bool(node, "wrapText").unwrap_or(false),
        shrink_to_fit: attr_bool(node, "shrinkToFit").unwrap_or(false),
        indent: attr(node, "indent").unwrap_or(0),
        rotation: attr(node, "textRotation")
            .map(Alignment::rotation_from_ooxml)
            .unwrap_or(0),
    }
}

fn parse_protection(node: Node<'_, '_>) -> Protection {
    Protection {
        locked: attr_bool(node, "locked").unwrap_or(true),
        hidden: attr_bool(node, "hidden").unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="1"><numFmt numFmtId="164" formatCode="0.000"/></numFmts>
  <fonts count="2">
    <font><sz val="11"/><color theme="1"/><name val="Calibri"/></font>
    <font><b/><u/><sz val="14"/><color rgb="FFFF0000"/><name val="Arial"/><vertAlign val="superscript"/></font>
  </fonts>
  <fills count="3">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
    <fill><patternFill patternType="solid"><fgColor rgb="FFFFFF00"/><bgColor indexed="64"/></patternFill></fill>
  </fills>
  <borders count="2">
    <border><left/><right/><top/><bottom/><diagonal/></border>
    <border diagonalUp="1"><left style="thin"><color indexed="10"/></left><right/><top/><bottom style="double"/><diagonal style="hair"/></border>
  </borders>
  <cellXfs count="4">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="164" fontId="1" fillId="2" borderId="1" xfId="0" applyNumberFormat="1"/>
    <xf numFmtId="14" fontId="0" fillId="1" borderId="0" xfId="0">
      <alignment horizontal="center" vertical="top" wrapText="1" indent="2" textRotation="135"/>
      <protection locked="0" hidden="1"/>
    </xf>
  </cellXfs>
</styleSheet>"#;

    #[test]
    fn resolves_cell_xfs_into_bundles() {
        let sheet = Stylesheet::parse("xl/styles.xml", STYLES).unwrap();
        assert_eq!(sheet.len(), 3);
        assert!(sheet.cell_style(0).is_none());

        let styled = sheet.cell_style(1).unwrap();
        assert_eq!(styled.number_format, NumberFormat::Custom("0.000".into()));
        assert!(styled.font.bold);
        assert_eq!(styled.font.underline, Underline::Single);
        assert_eq!(styled.font.size, Some(14.0));
        assert_eq!(styled.font.name.as_deref(), Some("Arial"));
        assert_eq!(styled.font.color, Some(ColorRef::Rgb(0xFF0000)));
        assert_eq!(styled.font.script, FontScript::Superscript);
        assert!(styled.fill.is_solid());
        assert_eq!(styled.fill.foreground, Some(ColorRef::Rgb(0xFFFF00)));
        assert_eq!(styled.fill.background, None);
        assert_eq!(styled.border.left.style, BorderStyle::Thin);
        assert_eq!(styled.border.left.color, Some(ColorRef::Indexed(10)));
        assert_eq!(styled.border.bottom.style, BorderStyle::Double);
        assert!(styled.border.diagonal_up);
        assert!(!styled.border.diagonal_down);
    }

    #[test]
    fn reads_alignment_protection_and_builtin_formats() {
        let sheet = Stylesheet::parse("xl/styles.xml", STYLES).unwrap();
        let styled = sheet.cell_style(2).unwrap();

        assert_eq!(styled.number_format, NumberFormat::Builtin(14));
        assert_eq!(styled.fill.kind, FillKind::Pattern("gray125".into()));
        assert_eq!(styled.alignment.horizontal, HorizontalAlign::Center);
        assert_eq!(styled.alignment.vertical, VerticalAlign::Top);
        assert!(styled.alignment.wrap_text);
        assert_eq!(styled.alignment.indent, 2);
        assert_eq!(styled.alignment.rotation, -45);
        assert!(!styled.protection.locked);
        assert!(styled.protection.hidden);
        assert_eq!(styled.font.color, Some(ColorRef::Theme(1)));
    }
}
