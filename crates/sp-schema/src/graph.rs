use std::collections::{BTreeMap, BTreeSet};

use sp_core::{escape_entities, ScriptPropsError};
use sp_parser::{SchemaDocument, SchemaElement};
use tracing::warn;

use crate::import::{parse_import_directive, resolve_import_literals, LibraryLoader};

pub const SUPERTYPE_SENTINEL: &str = "datatype";
pub const BOOLEAN_TRUE_LITERAL: &str = "==true";
pub const BOOLEAN_FALSE_LITERAL: &str = "==false";

pub const SENTINEL_PRIMITIVES: [&str; 6] = ["", "boolean", "int", "string", "list", "datatype"];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeEntry {
    pub properties: BTreeMap<String, String>,
    pub supertype: Option<String>,
    pub literals: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeGraph {
    pub entries: BTreeMap<String, TypeEntry>,
}

impl TypeGraph {
    pub fn entry(&self, name: &str) -> Option<&TypeEntry> {
        self.entries.get(name)
    }

    pub fn is_sentinel(name: &str) -> bool {
        SENTINEL_PRIMITIVES.contains(&name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GraphBuildReport {
    pub graph: TypeGraph,
    pub warnings: Vec<ScriptPropsError>,
}

pub fn build_type_graph(
    document: &SchemaDocument,
    loader: &dyn LibraryLoader,
) -> GraphBuildReport {
    let mut report = GraphBuildReport::default();

    for element in &document.root.children {
        match element.name.as_str() {
            "keyword" => register_declaration(&mut report, element, false, loader),
            "datatype" => register_declaration(&mut report, element, true, loader),
            _ => {}
        }
    }

    let boolean = report
        .graph
        .entries
        .entry("boolean".to_string())
        .or_default();
    boolean.literals.insert(BOOLEAN_TRUE_LITERAL.to_string());
    boolean.literals.insert(BOOLEAN_FALSE_LITERAL.to_string());

    report
}

fn register_declaration(
    report: &mut GraphBuildReport,
    element: &SchemaElement,
    allow_supertype: bool,
    loader: &dyn LibraryLoader,
) {
    let Some(raw_name) = element.attr("name") else {
        let warning = ScriptPropsError::new(
            "SCHEMA_DECL_UNNAMED",
            format!("<{}> declaration has no name attribute.", element.name),
        );
        warn!(declaration = %element.name, "skipping unnamed declaration");
        report.warnings.push(warning);
        return;
    };
    let name = escape_entities(raw_name);

    let mut supertype = None;
    if allow_supertype {
        if let Some(parent) = element.attr("type") {
            if parent != SUPERTYPE_SENTINEL {
                supertype = Some(escape_entities(parent));
            }
        }
    }

    let mut properties = Vec::new();
    let mut literals = Vec::new();
    for child in &element.children {
        match child.name.as_str() {
            "property" => {
                let Some(raw_property) = child.attr("name") else {
                    let warning = ScriptPropsError::new(
                        "SCHEMA_PROPERTY_UNNAMED",
                        format!("<property> under \"{}\" has no name attribute.", raw_name),
                    );
                    warn!(owner = %raw_name, "skipping unnamed property");
                    report.warnings.push(warning);
                    continue;
                };
                properties.push((
                    escape_entities(raw_property),
                    escape_entities(child.attr("type").unwrap_or("")),
                ));
            }
            "import" => match parse_import_directive(child)
                .and_then(|directive| resolve_import_literals(&directive, loader))
            {
                Ok(imported) => literals.extend(imported),
                Err(error) => {
                    warn!(owner = %raw_name, code = %error.code, "import resolution failed: {}", error.message);
                    report.warnings.push(error);
                }
            },
            _ => {}
        }
    }

    let entry = report.graph.entries.entry(name).or_default();
    if supertype.is_some() {
        entry.supertype = supertype;
    }
    for (property, property_type) in properties {
        entry.properties.entry(property).or_insert(property_type);
    }
    entry.literals.extend(literals);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::LibraryLoader;
    use sp_parser::parse_schema_document;

    struct NoLibraries;

    impl LibraryLoader for NoLibraries {
        fn load(&self, source: &str) -> Result<String, ScriptPropsError> {
            Err(ScriptPropsError::new(
                "IMPORT_READ_ERROR",
                format!("No library file \"{}\" available.", source),
            ))
        }
    }

    struct MapLoader(BTreeMap<String, String>);

    impl LibraryLoader for MapLoader {
        fn load(&self, source: &str) -> Result<String, ScriptPropsError> {
            self.0.get(source).cloned().ok_or_else(|| {
                ScriptPropsError::new(
                    "IMPORT_READ_ERROR",
                    format!("No library file \"{}\" available.", source),
                )
            })
        }
    }

    fn build(source: &str) -> GraphBuildReport {
        let document = parse_schema_document(source).expect("schema should parse");
        build_type_graph(&document, &NoLibraries)
    }

    #[test]
    fn build_type_graph_registers_keywords_and_datatypes_with_properties() {
        let report = build(
            r#"
<scriptproperties>
  <keyword name="player">
    <property name="name" type="string"/>
    <property name="ship" type="ship"/>
  </keyword>
  <datatype name="ship" type="component">
    <property name="idcode" type="string"/>
  </datatype>
  <datatype name="component" type="datatype">
    <property name="exists" type="boolean"/>
  </datatype>
</scriptproperties>
"#,
        );
        assert!(report.warnings.is_empty());

        let player = report.graph.entry("player").expect("player entry");
        assert_eq!(player.supertype, None);
        assert_eq!(player.properties.get("ship"), Some(&"ship".to_string()));

        let ship = report.graph.entry("ship").expect("ship entry");
        assert_eq!(ship.supertype, Some("component".to_string()));

        // The "datatype" sentinel never becomes a real supertype.
        let component = report.graph.entry("component").expect("component entry");
        assert_eq!(component.supertype, None);
        assert_eq!(
            component.properties.get("exists"),
            Some(&"boolean".to_string())
        );
    }

    #[test]
    fn build_type_graph_always_seeds_boolean_literals() {
        let report = build("<scriptproperties/>");
        let boolean = report.graph.entry("boolean").expect("boolean entry");
        assert!(boolean.literals.contains(BOOLEAN_TRUE_LITERAL));
        assert!(boolean.literals.contains(BOOLEAN_FALSE_LITERAL));

        let declared = build(
            r#"<scriptproperties><datatype name="boolean" type="datatype"/></scriptproperties>"#,
        );
        let redeclared = declared.graph.entry("boolean").expect("boolean entry");
        assert!(redeclared.literals.contains(BOOLEAN_TRUE_LITERAL));
        assert!(redeclared.literals.contains(BOOLEAN_FALSE_LITERAL));
    }

    #[test]
    fn build_type_graph_escapes_angle_brackets_in_names() {
        let report = build(
            r#"
<scriptproperties>
  <keyword name="md">
    <property name="&lt;cuename&gt;" type="cue"/>
  </keyword>
</scriptproperties>
"#,
        );
        let md = report.graph.entry("md").expect("md entry");
        assert!(md.properties.contains_key("&lt;cuename&gt;"));
    }

    #[test]
    fn build_type_graph_records_unnamed_declarations_as_warnings() {
        let report = build(
            r#"
<scriptproperties>
  <keyword>
    <property name="orphan"/>
  </keyword>
  <datatype name="ok">
    <property type="string"/>
  </datatype>
</scriptproperties>
"#,
        );
        let codes: Vec<&str> = report
            .warnings
            .iter()
            .map(|warning| warning.code.as_str())
            .collect();
        assert!(codes.contains(&"SCHEMA_DECL_UNNAMED"));
        assert!(codes.contains(&"SCHEMA_PROPERTY_UNNAMED"));
        assert!(report.graph.entry("ok").expect("ok entry").properties.is_empty());
    }

    #[test]
    fn build_type_graph_resolves_import_literals_onto_owning_type() {
        let libraries = MapLoader(BTreeMap::from([(
            "factions.xml".to_string(),
            r#"
<factions>
  <faction id="argon"/>
  <faction id="teladi"/>
</factions>
"#
            .to_string(),
        )]));

        let document = parse_schema_document(
            r#"
<scriptproperties>
  <datatype name="faction">
    <import source="factions.xml" select="/factions/faction">
      <property name="id"/>
    </import>
  </datatype>
</scriptproperties>
"#,
        )
        .expect("schema should parse");
        let report = build_type_graph(&document, &libraries);
        assert!(report.warnings.is_empty());

        let faction = report.graph.entry("faction").expect("faction entry");
        assert!(faction.literals.contains("argon"));
        assert!(faction.literals.contains("teladi"));
        assert!(faction.properties.is_empty());
    }

    #[test]
    fn build_type_graph_keeps_partial_results_on_import_failure() {
        let report = build(
            r#"
<scriptproperties>
  <datatype name="faction">
    <import source="missing.xml" select="/factions/faction">
      <property name="id"/>
    </import>
    <property name="isenemy" type="boolean"/>
  </datatype>
</scriptproperties>
"#,
        );
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].code, "IMPORT_READ_ERROR");

        let faction = report.graph.entry("faction").expect("faction entry");
        assert!(faction.literals.is_empty());
        assert!(faction.properties.contains_key("isenemy"));
    }

    #[test]
    fn build_type_graph_is_idempotent_for_fixed_input() {
        let source = r#"
<scriptproperties>
  <keyword name="player">
    <property name="name" type="string"/>
  </keyword>
  <datatype name="ship" type="component"/>
</scriptproperties>
"#;
        let first = build(source);
        let second = build(source);
        assert_eq!(first.graph, second.graph);
    }

    #[test]
    fn build_type_graph_keeps_first_property_type_on_duplicate_names() {
        let report = build(
            r#"
<scriptproperties>
  <keyword name="player">
    <property name="name" type="string"/>
    <property name="name" type="numeric"/>
  </keyword>
</scriptproperties>
"#,
        );
        let player = report.graph.entry("player").expect("player entry");
        assert_eq!(player.properties.get("name"), Some(&"string".to_string()));
    }
}
