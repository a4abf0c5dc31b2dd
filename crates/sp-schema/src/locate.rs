use std::collections::BTreeMap;

use regex::Regex;
use sp_core::{ScriptPropsError, SourceLocation, SourceSpan};
use tracing::warn;

use crate::graph::TypeGraph;

pub type LocationIndex = BTreeMap<String, SourceSpan>;

// Spans close two characters past the declaring tag's `>`, which keeps
// self-closing `/>` tags inside the reported range.
const TAG_CLOSE_OVERSHOOT: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclRange {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Default)]
pub struct LocationBuildReport {
    pub index: LocationIndex,
    pub warnings: Vec<ScriptPropsError>,
}

pub fn build_location_index(raw: &str, graph: &TypeGraph) -> LocationBuildReport {
    let mut report = LocationBuildReport::default();

    for (type_name, entry) in &graph.entries {
        let Some(type_range) = find_type_decl_range(raw, type_name) else {
            let warning = ScriptPropsError::new(
                "LOCATION_TYPE_NOT_FOUND",
                format!("No declaring tag found for type \"{}\".", type_name),
            );
            warn!(type_name = %type_name, "type declaration not found in raw schema text");
            report.warnings.push(warning);
            continue;
        };
        report
            .index
            .insert(type_name.clone(), span_at(raw, &type_range));

        for property_name in entry.properties.keys() {
            match find_property_decl_range(raw, type_range.end, property_name) {
                Some(property_range) => {
                    report.index.insert(
                        format!("{}.{}", type_name, property_name),
                        span_at(raw, &property_range),
                    );
                }
                None => {
                    let warning = ScriptPropsError::new(
                        "LOCATION_PROPERTY_NOT_FOUND",
                        format!(
                            "No declaring tag found for property \"{}.{}\".",
                            type_name, property_name
                        ),
                    );
                    warn!(type_name = %type_name, property = %property_name, "property declaration not found in raw schema text");
                    report.warnings.push(warning);
                }
            }
        }
    }

    report
}

pub fn find_type_decl_range(raw: &str, escaped_name: &str) -> Option<DeclRange> {
    let pattern = format!(
        r#"<(?:keyword|datatype)\s+name="{}""#,
        regex::escape(escaped_name)
    );
    find_decl_range(raw, 0, &pattern)
}

pub fn find_property_decl_range(raw: &str, from: usize, escaped_name: &str) -> Option<DeclRange> {
    let pattern = format!(r#"<property\s+name="{}""#, regex::escape(escaped_name));
    find_decl_range(raw, from, &pattern)
}

fn find_decl_range(raw: &str, from: usize, pattern: &str) -> Option<DeclRange> {
    if from > raw.len() {
        return None;
    }
    let regex = Regex::new(pattern).expect("declaration pattern must compile");
    let found = regex.find(&raw[from..])?;
    let start = from + found.start();
    let close = raw[start..].find('>')?;

    // Advance char-wise so the overshoot never splits a multibyte character.
    let mut end = start + close;
    for _ in 0..TAG_CLOSE_OVERSHOOT {
        match raw[end..].chars().next() {
            Some(ch) => end += ch.len_utf8(),
            None => break,
        }
    }
    Some(DeclRange { start, end })
}

pub fn location_at(raw: &str, offset: usize) -> SourceLocation {
    let clamped = offset.min(raw.len());
    let mut line = 1;
    let mut column = 1;
    for ch in raw[..clamped].chars() {
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    SourceLocation { line, column }
}

fn span_at(raw: &str, range: &DeclRange) -> SourceSpan {
    SourceSpan {
        start: location_at(raw, range.start),
        end: location_at(raw, range.end),
    }
}
