use roxmltree::Node;
use tracing::debug;

use crate::model::{CellRef, Image};
use crate::ooxml::PackageError;
use crate::ooxml::package::Package;
use crate::ooxml::xml::{attr, child, descendant, is_named, parse_xml, relationship_id};

const EMU_PER_PIXEL: f64 = 9525.0;
const IMAGE_REL: &str = "/image";

/// A picture anchor before its media bytes are fetched.
#[derive(Debug, Clone, PartialEq)]
struct PictureAnchor {
    embed: String,
    anchor: CellRef,
    offset_x: u32,
    offset_y: u32,
    width: Option<f64>,
    height: Option<f64>,
    description: Option<String>,
}

/// Pictures anchored to cells in a drawing part. Shapes, charts and absolutely
/// positioned pictures are not carried over.
pub(crate) fn read_images(package: &mut Package<'_>, part: &str) -> Result<Vec<Image>, PackageError> {
    let xml = package.read_xml(part)?;
    let anchors = parse_anchors(part, &xml)?;
    if anchors.is_empty() {
        return Ok(Vec::new());
    }

    let rels = package.relationships(part)?;
    let mut images = Vec::with_capacity(anchors.len());
    for anchor in anchors {
        let Some(rel) = rels
            .iter()
            .find(|rel| rel.id == anchor.embed && rel.is(IMAGE_REL) && !rel.external)
        else {
            debug!(part, embed = %anchor.embed, "picture without embedded media, skipped");
            continue;
        };
        if !package.has_part(&rel.target) {
            debug!(part, media = %rel.target, "picture media missing from package, skipped");
            continue;
        }

        images.push(Image {
            data: package.read_part(&rel.target)?,
            anchor: anchor.anchor,
            offset_x: anchor.offset_x,
            offset_y: anchor.offset_y,
            width: anchor.width,
            height: anchor.height,
            description: anchor.description,
        });
    }

    Ok(images)
}

fn parse_anchors(part: &str, xml: &str) -> Result<Vec<PictureAnchor>, PackageError> {
    let doc = parse_xml(part, xml)?;
    let root = doc.root_element();

    let mut anchors = Vec::new();
    for anchor in root
        .children()
        .filter(|n| is_named(n, "twoCellAnchor") || is_named(n, "oneCellAnchor"))
    {
        let (Some(from), Some(pic)) = (child(anchor, "from"), child(anchor, "pic")) else {
            continue;
        };
        let Some(embed) = descendant(pic, "blip").and_then(relationship_id) else {
            continue;
        };

        // A one-cell anchor carries its size on the anchor, a two-cell anchor on the shape.
        let extent = child(anchor, "ext")
            .or_else(|| descendant(pic, "xfrm").and_then(|xfrm| child(xfrm, "ext")));

        anchors.push(PictureAnchor {
            embed: embed.to_string(),
            anchor: CellRef::new(marker(from, "row"), marker(from, "col") as u16),
            offset_x: emu_to_pixels(marker(from, "colOff") as f64) as u32,
            offset_y: emu_to_pixels(marker(from, "rowOff") as f64) as u32,
            width: extent.and_then(|ext| attr::<f64>(ext, "cx")).map(emu_to_pixels),
            height: extent.and_then(|ext| attr::<f64>(ext, "cy")).map(emu_to_pixels),
            description: descendant(pic, "cNvPr")
                .and_then(|n| n.attribute("descr"))
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        });
    }

    Ok(anchors)
}

/// Integer text of a `<xdr:from>` child such as `<xdr:col>3</xdr:col>`.
fn marker(from: Node<'_, '_>, name: &str) -> u32 {
    child(from, name)
        .and_then(|n| n.text())
        .and_then(|text| text.trim().parse::<i64>().ok())
        .map_or(0, |value| value.clamp(0, u32::MAX as i64) as u32)
}

fn emu_to_pixels(emu: f64) -> f64 {
    (emu / EMU_PER_PIXEL).max(0.0)
}
