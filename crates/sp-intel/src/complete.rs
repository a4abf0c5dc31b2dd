use std::collections::{BTreeMap, BTreeSet};

use sp_core::{escape_entities, CompletionCandidate, CompletionList};
use sp_schema::{TypeEntry, TypeGraph};

use crate::token::ResolvedToken;

pub const MAX_EXPANSION_DEPTH: usize = 2;
pub const MAX_CANDIDATES: usize = 1000;
pub const MIN_BARE_TOKEN_LEN: usize = 2;

const PLACEHOLDER_OPEN: char = '{';
const PLACEHOLDER_CLOSE: char = '}';

pub fn expand_completions(graph: &TypeGraph, token: &ResolvedToken) -> CompletionList {
    let previous = escape_entities(&token.previous);
    let new_token = escape_entities(&token.new_token);

    let mut candidates: BTreeMap<String, Option<String>> = BTreeMap::new();

    if let Some(placeholder_type) = previous.strip_prefix(PLACEHOLDER_OPEN) {
        expand_placeholder_literals(graph, placeholder_type, &mut candidates);
    } else if !previous.is_empty() {
        expand_direct_properties(graph, &previous, &mut candidates);
    } else if new_token.chars().count() < MIN_BARE_TOKEN_LEN {
        // Near-empty input would match almost everything; stay quiet.
    } else {
        expand_prefix_fallback(graph, &new_token, &mut candidates);
    }

    CompletionList::incomplete(
        candidates
            .into_iter()
            .map(|(completion, detail)| CompletionCandidate { completion, detail })
            .collect(),
    )
}

fn expand_placeholder_literals(
    graph: &TypeGraph,
    placeholder_type: &str,
    candidates: &mut BTreeMap<String, Option<String>>,
) {
    let Some(entry) = graph.entry(placeholder_type) else {
        return;
    };
    for literal in &entry.literals {
        insert_candidate(
            candidates,
            format!("{}{}", literal, PLACEHOLDER_CLOSE),
            Some(format!("{}.{}", placeholder_type, literal)),
        );
    }
}

fn expand_direct_properties(
    graph: &TypeGraph,
    previous: &str,
    candidates: &mut BTreeMap<String, Option<String>>,
) {
    // Unknown previous token: no candidates. A backtracking search over the
    // graph could recover qualified prefixes here, but is not implemented.
    let Some(entry) = graph.entry(previous) else {
        return;
    };
    for property in entry.properties.keys() {
        insert_candidate(
            candidates,
            property.clone(),
            Some(format!("{}.{}", previous, property)),
        );
    }
}

fn expand_prefix_fallback(
    graph: &TypeGraph,
    new_token: &str,
    candidates: &mut BTreeMap<String, Option<String>>,
) {
    for (type_name, entry) in &graph.entries {
        if candidates.len() >= MAX_CANDIDATES {
            return;
        }
        if !type_name.starts_with(new_token) {
            continue;
        }
        insert_candidate(candidates, type_name.clone(), None);
        let mut visited = BTreeSet::new();
        expand_members(graph, type_name, entry, type_name, 0, &mut visited, candidates);
    }
}

fn expand_members(
    graph: &TypeGraph,
    type_name: &str,
    entry: &TypeEntry,
    prefix: &str,
    depth: usize,
    visited: &mut BTreeSet<String>,
    candidates: &mut BTreeMap<String, Option<String>>,
) {
    if depth > MAX_EXPANSION_DEPTH || candidates.len() >= MAX_CANDIDATES {
        return;
    }
    if !visited.insert(type_name.to_string()) {
        return;
    }

    for (property, property_type) in &entry.properties {
        let completion = format!("{}.{}", prefix, property);
        insert_candidate(
            candidates,
            completion.clone(),
            Some(format!("{}.{}", type_name, property)),
        );
        if !TypeGraph::is_sentinel(property_type) {
            if let Some(next) = graph.entry(property_type) {
                expand_members(
                    graph,
                    property_type,
                    next,
                    &completion,
                    depth + 1,
                    visited,
                    candidates,
                );
            }
        }
    }

    for literal in &entry.literals {
        insert_candidate(
            candidates,
            format!("{}.{}", prefix, literal),
            Some(format!("{}.{}", type_name, literal)),
        );
    }

    // Inherited properties surface alongside declared ones, one depth level
    // further down so cyclic supertype chains still terminate.
    if let Some(supertype) = &entry.supertype {
        if !TypeGraph::is_sentinel(supertype) {
            if let Some(parent) = graph.entry(supertype) {
                expand_members(graph, supertype, parent, prefix, depth + 1, visited, candidates);
            }
        }
    }

    visited.remove(type_name);
}

fn insert_candidate(
    candidates: &mut BTreeMap<String, Option<String>>,
    completion: String,
    detail: Option<String>,
) {
    if completion.is_empty() || candidates.len() >= MAX_CANDIDATES {
        return;
    }
    candidates.entry(completion).or_insert(detail);
}
