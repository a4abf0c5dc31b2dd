pub mod complete;
pub mod context;
pub mod definition;
pub mod token;

pub use complete::{expand_completions, MAX_CANDIDATES, MAX_EXPANSION_DEPTH};
pub use context::{IngestReport, ScriptPropsContext, ScriptPropsOptions};
pub use definition::{extract_quoted_token, resolve_definition};
pub use token::{resolve_token_context, ResolvedToken, BARE_LITERAL_DISTANCE};
