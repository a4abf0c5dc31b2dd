use std::fs;
use std::path::PathBuf;

use sp_core::{CompletionList, ScriptPropsError, SourceSpan};
use sp_parser::parse_schema_document;
use sp_schema::{
    build_location_index, build_type_graph, FsLibraryLoader, LibraryLoader, LocationIndex,
    TypeGraph,
};
use tracing::{debug, warn};

use crate::complete::expand_completions;
use crate::definition::resolve_definition;
use crate::token::resolve_token_context;

#[derive(Debug, Clone)]
pub struct ScriptPropsOptions {
    pub schema_path: PathBuf,
    pub game_root: PathBuf,
    pub verbose: bool,
}

#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub ingest_error: Option<ScriptPropsError>,
    pub warnings: Vec<ScriptPropsError>,
}

#[derive(Debug, Clone)]
pub struct ScriptPropsContext {
    graph: TypeGraph,
    locations: LocationIndex,
    report: IngestReport,
    verbose: bool,
}

impl ScriptPropsContext {
    pub fn load(options: &ScriptPropsOptions) -> Self {
        let loader = FsLibraryLoader::new(&options.game_root);
        match fs::read_to_string(&options.schema_path) {
            Ok(text) => Self::from_schema_text(&text, &loader, options.verbose),
            Err(error) => {
                let ingest_error = ScriptPropsError::new(
                    "SCHEMA_READ_ERROR",
                    format!(
                        "Failed to read schema \"{}\": {}",
                        options.schema_path.display(),
                        error
                    ),
                );
                warn!(code = %ingest_error.code, "{}", ingest_error.message);
                Self::degraded(ingest_error, options.verbose)
            }
        }
    }

    pub fn from_schema_text(text: &str, loader: &dyn LibraryLoader, verbose: bool) -> Self {
        let document = match parse_schema_document(text) {
            Ok(document) => document,
            Err(error) => {
                warn!(code = %error.code, "{}", error.message);
                return Self::degraded(error, verbose);
            }
        };

        let graph_report = build_type_graph(&document, loader);
        let location_report = build_location_index(text, &graph_report.graph);

        let mut warnings = graph_report.warnings;
        warnings.extend(location_report.warnings);

        Self {
            graph: graph_report.graph,
            locations: location_report.index,
            report: IngestReport {
                ingest_error: None,
                warnings,
            },
            verbose,
        }
    }

    fn degraded(ingest_error: ScriptPropsError, verbose: bool) -> Self {
        Self {
            graph: TypeGraph::default(),
            locations: LocationIndex::default(),
            report: IngestReport {
                ingest_error: Some(ingest_error),
                warnings: Vec::new(),
            },
            verbose,
        }
    }

    pub fn report(&self) -> &IngestReport {
        &self.report
    }

    pub fn graph(&self) -> &TypeGraph {
        &self.graph
    }

    pub fn locations(&self) -> &LocationIndex {
        &self.locations
    }

    pub fn complete(&self, line_prefix: &str) -> CompletionList {
        let Some(token) = resolve_token_context(line_prefix) else {
            return CompletionList::empty();
        };
        if self.verbose {
            debug!(
                previous = %token.previous,
                new_token = %token.new_token,
                "resolved completion context"
            );
        }
        expand_completions(&self.graph, &token)
    }

    pub fn definition(&self, line: &str, column: usize) -> Option<SourceSpan> {
        let span = resolve_definition(&self.locations, line, column);
        if self.verbose {
            debug!(found = span.is_some(), "resolved definition request");
        }
        span
    }
}
