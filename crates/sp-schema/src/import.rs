use std::fs;
use std::path::PathBuf;

use sp_core::{escape_entities, ScriptPropsError};
use sp_parser::{parse_schema_document, SchemaElement};

pub const LIBRARY_SUBDIR: &str = "libraries";

pub trait LibraryLoader {
    fn load(&self, source: &str) -> Result<String, ScriptPropsError>;
}

#[derive(Debug, Clone)]
pub struct FsLibraryLoader {
    root: PathBuf,
}

impl FsLibraryLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl LibraryLoader for FsLibraryLoader {
    fn load(&self, source: &str) -> Result<String, ScriptPropsError> {
        let path = self.root.join(LIBRARY_SUBDIR).join(source);
        fs::read_to_string(&path).map_err(|error| {
            ScriptPropsError::new(
                "IMPORT_READ_ERROR",
                format!("Failed to read import \"{}\": {}", path.display(), error),
            )
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDirective {
    pub source: String,
    pub select: String,
    pub target_attribute: String,
}

pub fn parse_import_directive(
    element: &SchemaElement,
) -> Result<ImportDirective, ScriptPropsError> {
    let Some(source) = element.attr("source") else {
        return Err(ScriptPropsError::new(
            "IMPORT_SOURCE_MISSING",
            "<import> directive has no source attribute.",
        ));
    };
    let Some(select) = element.attr("select") else {
        return Err(ScriptPropsError::new(
            "IMPORT_SELECT_MISSING",
            format!("<import source=\"{}\"> has no select attribute.", source),
        ));
    };
    let target_attribute = element
        .children_named("property")
        .first()
        .and_then(|property| property.attr("name"));
    let Some(target_attribute) = target_attribute else {
        return Err(ScriptPropsError::new(
            "IMPORT_TARGET_MISSING",
            format!(
                "<import source=\"{}\"> has no nested <property name=...> naming the target attribute.",
                source
            ),
        ));
    };

    Ok(ImportDirective {
        source: source.to_string(),
        select: select.to_string(),
        target_attribute: target_attribute.to_string(),
    })
}

pub fn resolve_import_literals(
    directive: &ImportDirective,
    loader: &dyn LibraryLoader,
) -> Result<Vec<String>, ScriptPropsError> {
    let text = loader.load(&directive.source)?;
    let document = parse_schema_document(&text).map_err(|error| {
        ScriptPropsError::new(
            "IMPORT_PARSE_ERROR",
            format!("Import \"{}\": {}", directive.source, error.message),
        )
    })?;

    let matched = evaluate_select(&document.root, &directive.select)?;
    Ok(matched
        .iter()
        .filter_map(|element| element.attr(&directive.target_attribute))
        .map(escape_entities)
        .collect())
}

pub fn evaluate_select<'a>(
    root: &'a SchemaElement,
    select: &str,
) -> Result<Vec<&'a SchemaElement>, ScriptPropsError> {
    if let Some(tag) = select.strip_prefix("//") {
        if tag.is_empty() || tag.contains('/') {
            return Err(unsupported_select(select));
        }
        let mut found = Vec::new();
        if root.name == tag {
            found.push(root);
        }
        collect_descendants(root, tag, &mut found);
        return Ok(found);
    }

    let Some(path) = select.strip_prefix('/') else {
        return Err(unsupported_select(select));
    };
    let segments: Vec<&str> = path.split('/').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(unsupported_select(select));
    }

    if root.name != segments[0] {
        return Ok(Vec::new());
    }
    let mut current = vec![root];
    for segment in &segments[1..] {
        current = current
            .iter()
            .copied()
            .flat_map(|element| {
                element
                    .children
                    .iter()
                    .filter(|child| child.name == *segment)
            })
            .collect();
    }
    Ok(current)
}

fn collect_descendants<'a>(
    element: &'a SchemaElement,
    tag: &str,
    found: &mut Vec<&'a SchemaElement>,
) {
    for child in &element.children {
        if child.name == tag {
            found.push(child);
        }
        collect_descendants(child, tag, found);
    }
}

fn unsupported_select(select: &str) -> ScriptPropsError {
    ScriptPropsError::new(
        "IMPORT_SELECT_UNSUPPORTED",
        format!(
            "Select query \"{}\" is not supported; use /path/to/element or //element.",
            select
        ),
    )
}
