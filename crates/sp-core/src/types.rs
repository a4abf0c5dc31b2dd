use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionCandidate {
    pub completion: String,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionList {
    pub items: Vec<CompletionCandidate>,
    pub is_incomplete: bool,
}

impl CompletionList {
    pub fn incomplete(items: Vec<CompletionCandidate>) -> Self {
        Self {
            items,
            is_incomplete: true,
        }
    }

    pub fn empty() -> Self {
        Self::incomplete(Vec::new())
    }
}
