//! Small helpers over `roxmltree` nodes. Element names are matched on their local
//! part so transitional and strict packages read the same way.

use std::str::FromStr;

use roxmltree::{Document, Node};

use crate::ooxml::PackageError;

pub(crate) fn parse_xml<'x>(part: &str, xml: &'x str) -> Result<Document<'x>, PackageError> {
    Document::parse(xml).map_err(|source| PackageError::Xml {
        part: part.to_string(),
        source,
    })
}

pub(crate) fn is_named(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

pub(crate) fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is_named(n, name))
}

pub(crate) fn children<'a, 'input>(
    node: Node<'a, 'input>,
    name: &str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |n| is_named(n, name))
}

pub(crate) fn descendant<'a, 'input>(
    node: Node<'a, 'input>,
    name: &str,
) -> Option<Node<'a, 'input>> {
    node.descendants().find(|n| is_named(n, name))
}

pub(crate) fn attr<T: FromStr>(node: Node<'_, '_>, name: &str) -> Option<T> {
    node.attribute(name)?.trim().parse().ok()
}

/// `1`/`true` are true, anything else present is false.
pub(crate) fn attr_bool(node: Node<'_, '_>, name: &str) -> Option<bool> {
    node.attribute(name)
        .map(|v| matches!(v.trim(), "1" | "true"))
}

/// Boolean toggle elements such as `<b/>`: present means on unless `val` says otherwise.
pub(crate) fn flag(node: Node<'_, '_>, name: &str) -> bool {
    child(node, name).is_some_and(|n| attr_bool(n, "val").unwrap_or(true))
}

/// The `val` attribute of a child element, e.g. `<sz val="11"/>`.
pub(crate) fn child_val<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    child(node, name)?.attribute("val")
}

/// The relationship id on a node (`r:id`, `r:embed`), whichever relationship
/// namespace the package uses.
pub(crate) fn relationship_id<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.attributes()
        .find(|a| a.namespace().is_some() && matches!(a.name(), "id" | "embed"))
        .map(|a| a.value())
}
