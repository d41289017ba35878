//! Mapping from the property names a guest assigns (`el[name] = value`) to
//! what the bridge does with the host node.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyTarget {
    Attribute(String),
    TextContent,
    InnerHtml,
    /// Character data of a text node (`data`, `nodeValue`).
    CharacterData,
}

pub fn classify(name: &str) -> PropertyTarget {
    match name {
        "textContent" | "innerText" => PropertyTarget::TextContent,
        "innerHTML" => PropertyTarget::InnerHtml,
        "data" | "nodeValue" => PropertyTarget::CharacterData,
        other => PropertyTarget::Attribute(attribute_name(other)),
    }
}

/// Reflected attribute for a property name.
pub fn attribute_name(property: &str) -> String {
    match property {
        "className" => "class".to_string(),
        "htmlFor" => "for".to_string(),
        "ariaHidden" => "aria-hidden".to_string(),
        "tabIndex" => "tabindex".to_string(),
        "readOnly" => "readonly".to_string(),
        "maxLength" => "maxlength".to_string(),
        "colSpan" => "colspan".to_string(),
        "rowSpan" => "rowspan".to_string(),
        other => other.to_ascii_lowercase(),
    }
}
