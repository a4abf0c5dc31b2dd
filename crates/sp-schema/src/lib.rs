pub mod graph;
pub mod import;
pub mod locate;

pub use graph::{
    build_type_graph, GraphBuildReport, TypeEntry, TypeGraph, BOOLEAN_FALSE_LITERAL,
    BOOLEAN_TRUE_LITERAL, SENTINEL_PRIMITIVES, SUPERTYPE_SENTINEL,
};
pub use import::{
    parse_import_directive, resolve_import_literals, FsLibraryLoader, ImportDirective,
    LibraryLoader, LIBRARY_SUBDIR,
};
pub use locate::{
    build_location_index, find_property_decl_range, find_type_decl_range, location_at,
    DeclRange, LocationBuildReport, LocationIndex,
};
