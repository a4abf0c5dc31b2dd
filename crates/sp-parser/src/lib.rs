pub mod schema;

pub use schema::{parse_schema_document, SchemaDocument, SchemaElement};
