//! Thin layer over the blitz document: every structural primitive the
//! dispatcher needs, expressed on raw node ids.

use blitz_dom::node::NodeData;
use blitz_dom::{ns, BaseDocument, DocumentMutator, LocalName, QualName};
use tracing::{debug, warn};

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
pub const MATHML_NAMESPACE: &str = "http://www.w3.org/1998/Math/MathML";
pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Kind of a host node, as far as the bridge cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element { tag: String, namespace: Option<&'static str> },
    Text(String),
    Other,
}

pub fn html_name(name: &str) -> QualName {
    qualify_name(name, None)
}

pub fn qualify_name(name: &str, namespace: Option<&str>) -> QualName {
    let local = LocalName::from(name);
    match namespace {
        Some(uri) if uri.eq_ignore_ascii_case(SVG_NAMESPACE) => QualName::new(None, ns!(svg), local),
        Some(uri) if uri.eq_ignore_ascii_case(MATHML_NAMESPACE) => {
            QualName::new(None, ns!(mathml), local)
        }
        Some(uri) if uri.eq_ignore_ascii_case(XHTML_NAMESPACE) => {
            QualName::new(None, ns!(html), local)
        }
        Some(uri) => {
            debug!(target = "bridge", namespace = uri, "unsupported namespace, using html");
            QualName::new(None, ns!(html), local)
        }
        None => QualName::new(None, ns!(html), local),
    }
}

pub fn create_element(document: &mut BaseDocument, tag: &str, namespace: Option<&str>) -> usize {
    let mut mutator = DocumentMutator::new(document);
    mutator.create_element(qualify_name(tag, namespace), Vec::new())
}

pub fn create_text_node(document: &mut BaseDocument, text: &str) -> usize {
    let mut mutator = DocumentMutator::new(document);
    mutator.create_text_node(text)
}

pub fn kind(document: &BaseDocument, node_id: usize) -> NodeKind {
    let Some(node) = document.get_node(node_id) else {
        return NodeKind::Other;
    };
    match &node.data {
        NodeData::Element(data) | NodeData::AnonymousBlock(data) => {
            let namespace = if data.name.ns == ns!(html) {
                Some(XHTML_NAMESPACE)
            } else if data.name.ns == ns!(svg) {
                Some(SVG_NAMESPACE)
            } else if data.name.ns == ns!(mathml) {
                Some(MATHML_NAMESPACE)
            } else {
                None
            };
            NodeKind::Element {
                tag: data.name.local.as_ref().to_string(),
                namespace,
            }
        }
        NodeData::Text(text) => NodeKind::Text(text.content.clone()),
        _ => NodeKind::Other,
    }
}

pub fn is_text(document: &BaseDocument, node_id: usize) -> bool {
    document
        .get_node(node_id)
        .map(|node| matches!(node.data, NodeData::Text(_)))
        .unwrap_or(false)
}

pub fn parent(document: &BaseDocument, node_id: usize) -> Option<usize> {
    document.get_node(node_id).and_then(|node| node.parent)
}

pub fn children(document: &BaseDocument, node_id: usize) -> Vec<usize> {
    document
        .get_node(node_id)
        .map(|node| node.children.clone())
        .unwrap_or_default()
}

pub fn child_at(document: &BaseDocument, parent_id: usize, index: usize) -> Option<usize> {
    document
        .get_node(parent_id)
        .and_then(|node| node.children.get(index).copied())
}

pub fn last_child(document: &BaseDocument, parent_id: usize) -> Option<usize> {
    document
        .get_node(parent_id)
        .and_then(|node| node.children.last().copied())
}

pub fn next_sibling(document: &BaseDocument, node_id: usize) -> Option<usize> {
    let parent_id = parent(document, node_id)?;
    let siblings = &document.get_node(parent_id)?.children;
    let position = siblings.iter().position(|id| *id == node_id)?;
    siblings.get(position + 1).copied()
}

/// Node followed by its ancestors up to the document root.
pub fn ancestors(document: &BaseDocument, node_id: usize) -> Vec<usize> {
    let mut chain = Vec::with_capacity(16);
    let mut next = Some(node_id);
    while let Some(id) = next {
        if document.get_node(id).is_none() {
            break;
        }
        chain.push(id);
        next = parent(document, id);
    }
    chain
}

pub fn attribute(document: &BaseDocument, node_id: usize, name: &str) -> Option<String> {
    document
        .get_node(node_id)
        .and_then(|node| node.attr(LocalName::from(name)).map(|value| value.to_string()))
}

pub fn text_content(document: &BaseDocument, node_id: usize) -> String {
    document
        .get_node(node_id)
        .map(|node| node.text_content())
        .unwrap_or_default()
}

pub fn query_selector(document: &BaseDocument, selector: &str) -> Option<usize> {
    document.query_selector(selector).ok().flatten()
}

/// Detaches a node from its parent. Returns false when it had none.
pub fn detach(document: &mut BaseDocument, node_id: usize) -> bool {
    if parent(document, node_id).is_none() {
        return false;
    }
    let mut mutator = DocumentMutator::new(document);
    mutator.remove_node(node_id);
    true
}

pub fn append_child(document: &mut BaseDocument, parent_id: usize, child_id: usize) {
    detach(document, child_id);
    let mut mutator = DocumentMutator::new(document);
    mutator.append_children(parent_id, &[child_id]);
}

/// `insertBefore` semantics: no reference appends, and a reference equal to
/// the inserted node means "before its next sibling". The node keeps its id.
///
/// Unlike DOM `insertBefore`, a reference that is not a child of `parent_id`
/// does not fail: the node is appended and a warning is logged.
pub fn insert_before(
    document: &mut BaseDocument,
    parent_id: usize,
    node_id: usize,
    reference: Option<usize>,
) {
    let reference = match reference {
        Some(id) if id == node_id => next_sibling(document, node_id),
        Some(id) if parent(document, id) != Some(parent_id) => {
            warn!(
                target = "bridge",
                node = node_id,
                reference = id,
                parent = parent_id,
                "insert_before reference is not a child of parent, appending"
            );
            None
        }
        other => other,
    };
    detach(document, node_id);
    let mut mutator = DocumentMutator::new(document);
    match reference {
        Some(anchor) => mutator.insert_nodes_before(anchor, &[node_id]),
        None => mutator.append_children(parent_id, &[node_id]),
    }
}

/// Puts `new_id` where `old_id` is. A parentless `old_id` is left alone and
/// replacing a node with itself does nothing.
pub fn replace(document: &mut BaseDocument, old_id: usize, new_id: usize) -> bool {
    if parent(document, old_id).is_none() {
        return false;
    }
    if old_id == new_id {
        return true;
    }
    detach(document, new_id);
    let mut mutator = DocumentMutator::new(document);
    mutator.replace_node_with(old_id, &[new_id]);
    true
}

pub fn deep_clone(document: &mut BaseDocument, node_id: usize) -> usize {
    let mut mutator = DocumentMutator::new(document);
    mutator.deep_clone_node(node_id)
}

pub fn set_attribute(document: &mut BaseDocument, node_id: usize, name: &str, value: &str) {
    let mut mutator = DocumentMutator::new(document);
    mutator.set_attribute(node_id, html_name(name), value);
}

pub fn remove_attribute(document: &mut BaseDocument, node_id: usize, name: &str) {
    if attribute(document, node_id, name).is_none() {
        return;
    }
    let mut mutator = DocumentMutator::new(document);
    mutator.clear_attribute(node_id, html_name(name));
}

/// Rewrites the character data of a text node in place.
pub fn set_text(document: &mut BaseDocument, node_id: usize, value: &str) {
    let mut mutator = DocumentMutator::new(document);
    mutator.set_node_text(node_id, value);
}

/// Detaches all children of an element (they stay alive) and appends a
/// single text child when `value` is non-empty.
pub fn set_element_text(document: &mut BaseDocument, node_id: usize, value: &str) {
    for child in children(document, node_id) {
        detach(document, child);
    }
    if value.is_empty() {
        return;
    }
    let text = create_text_node(document, value);
    let mut mutator = DocumentMutator::new(document);
    mutator.append_children(node_id, &[text]);
}

pub fn set_inner_html(document: &mut BaseDocument, node_id: usize, html: &str) {
    let mut mutator = DocumentMutator::new(document);
    mutator.set_inner_html(node_id, html);
}
