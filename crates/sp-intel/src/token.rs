pub const QUOTE_CHARS: [char; 2] = ['"', '\''];

// Without any earlier delimiter, text more than this many characters past
// the split point is treated as a bare literal rather than a dotted path.
// Empirical policy, not a guaranteed-correct parse.
pub const BARE_LITERAL_DISTANCE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedToken {
    pub previous: String,
    pub new_token: String,
}

fn is_quote(ch: char) -> bool {
    QUOTE_CHARS.contains(&ch)
}

fn is_delimiter(ch: char) -> bool {
    ch == '.' || is_quote(ch)
}

pub fn resolve_token_context(line_prefix: &str) -> Option<ResolvedToken> {
    let chars: Vec<char> = line_prefix.chars().collect();
    if chars.is_empty() {
        return None;
    }

    // A quote at the final position is the delimiter being typed, not
    // content, so quotes only count up to the second-to-last character.
    let last_dot = chars.iter().rposition(|ch| *ch == '.');
    let last_quote = chars[..chars.len() - 1]
        .iter()
        .rposition(|ch| is_quote(*ch));
    let delimiter = match (last_dot, last_quote) {
        (Some(dot), Some(quote)) => dot.max(quote),
        (Some(dot), None) => dot,
        (None, Some(quote)) => quote,
        (None, None) => return None,
    };

    let mut new_token: String = chars[delimiter + 1..].iter().collect();
    if new_token.ends_with(|ch: char| is_quote(ch)) {
        new_token.pop();
    }

    let prior = chars[..delimiter].iter().rposition(|ch| is_delimiter(*ch));
    let previous = match prior {
        Some(position) => chars[position + 1..delimiter].iter().collect(),
        None if chars.len() - delimiter > BARE_LITERAL_DISTANCE => String::new(),
        None => chars[..delimiter].iter().collect(),
    };

    Some(ResolvedToken {
        previous,
        new_token,
    })
}
