use std::collections::BTreeMap;

use roxmltree::{Document, Node};
use sp_core::ScriptPropsError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDocument {
    pub root: SchemaElement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaElement {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<SchemaElement>,
}

impl SchemaElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn children_named(&self, name: &str) -> Vec<&SchemaElement> {
        self.children
            .iter()
            .filter(|child| child.name == name)
            .collect()
    }
}

pub fn parse_schema_document(source: &str) -> Result<SchemaDocument, ScriptPropsError> {
    let document = Document::parse(source)
        .map_err(|error| ScriptPropsError::new("XML_PARSE_ERROR", error.to_string()))?;

    let Some(root) = document.root().children().find(|node| node.is_element()) else {
        return Err(ScriptPropsError::new(
            "XML_PARSE_ERROR",
            "Schema document must contain a root element.",
        ));
    };

    Ok(SchemaDocument {
        root: parse_element(root),
    })
}

fn parse_element(node: Node<'_, '_>) -> SchemaElement {
    let mut attributes = BTreeMap::new();
    for attribute in node.attributes() {
        attributes.insert(attribute.name().to_string(), attribute.value().to_string());
    }

    let children = node
        .children()
        .filter(Node::is_element)
        .map(parse_element)
        .collect();

    SchemaElement {
        name: node.tag_name().name().to_string(),
        attributes,
        children,
    }
}
