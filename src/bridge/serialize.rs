//! HTML snapshots of the host tree, for debugging and tests.

use blitz_dom::node::NodeData;
use blitz_dom::BaseDocument;
use html_escape::{encode_double_quoted_attribute, encode_text};

use super::error::BridgeResult;
use super::handles::Handle;
use super::DomBridge;

impl DomBridge {
    pub fn outer_html(&self, handle: Handle) -> BridgeResult<String> {
        let node = self.handles.resolve(handle)?;
        let mut output = String::new();
        serialize_node(&self.document, node, &mut output);
        Ok(output)
    }

    pub fn inner_html(&self, handle: Handle) -> BridgeResult<String> {
        let node = self.handles.resolve(handle)?;
        let mut output = String::new();
        serialize_children(&self.document, node, &mut output);
        Ok(output)
    }

    pub fn document_html(&self) -> String {
        let mut output = String::from("<!DOCTYPE html>");
        let root = self.document.root_node().id;
        serialize_children(&self.document, root, &mut output);
        output
    }
}

fn serialize_children(document: &BaseDocument, node_id: usize, output: &mut String) {
    let Some(node) = document.get_node(node_id) else {
        return;
    };
    for child in &node.children {
        serialize_node(document, *child, output);
    }
}

fn serialize_node(document: &BaseDocument, node_id: usize, output: &mut String) {
    let Some(node) = document.get_node(node_id) else {
        return;
    };

    match &node.data {
        NodeData::Document | NodeData::AnonymousBlock(_) => {
            serialize_children(document, node_id, output);
        }
        NodeData::Element(data) => {
            output.push('<');
            output.push_str(data.name.local.as_ref());
            for attr in data.attrs.iter() {
                output.push(' ');
                output.push_str(attr.name.local.as_ref());
                output.push_str("=\"");
                output.push_str(&encode_double_quoted_attribute(&attr.value));
                output.push('"');
            }
            output.push('>');
            serialize_children(document, node_id, output);
            output.push_str("</");
            output.push_str(data.name.local.as_ref());
            output.push('>');
        }
        NodeData::Text(text) => {
            output.push_str(&encode_text(&text.content));
        }
        NodeData::Comment => output.push_str("<!---->"),
    }
}
