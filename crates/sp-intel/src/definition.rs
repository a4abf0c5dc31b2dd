use sp_core::{escape_entities, SourceSpan};
use sp_schema::LocationIndex;

use crate::token::QUOTE_CHARS;

pub fn resolve_definition(index: &LocationIndex, line: &str, column: usize) -> Option<SourceSpan> {
    let token = extract_quoted_token(line, column)?;
    lookup_with_suffixes(index, &escape_entities(&token))
}

pub fn extract_quoted_token(line: &str, column: usize) -> Option<String> {
    let chars: Vec<char> = line.chars().collect();
    let column = column.min(chars.len());

    let start = chars[..column]
        .iter()
        .rposition(|ch| QUOTE_CHARS.contains(ch))
        .map(|position| position + 1)
        .unwrap_or(0);
    let end = chars[column..]
        .iter()
        .position(|ch| QUOTE_CHARS.contains(ch))
        .map(|position| column + position)
        .unwrap_or(chars.len());

    let token: String = chars[start..end].iter().collect();
    let trimmed = token
        .trim()
        .trim_matches(|ch| QUOTE_CHARS.contains(&ch))
        .to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn lookup_with_suffixes(index: &LocationIndex, token: &str) -> Option<SourceSpan> {
    let mut remaining = token;
    loop {
        if let Some(span) = index.get(remaining) {
            return Some(span.clone());
        }
        // Qualified references often only have their leaf indexed; retry
        // with the leading segment stripped.
        match remaining.split_once('.') {
            Some((_, rest)) if !rest.is_empty() => remaining = rest,
            _ => return None,
        }
    }
}
