//! Lexical analysis of a single input line.
//!
//! The shell has no quoting, escaping or substitution: a line is a sequence of
//! words separated by runs of [`DELIMITERS`].

/// Characters that separate words: space, tab, carriage return and line feed.
pub const DELIMITERS: [char; 4] = [' ', '\t', '\r', '\n'];

const INITIAL_CAPACITY: usize = 8;

fn is_delimiter(ch: char) -> bool {
    DELIMITERS.contains(&ch)
}

/// Splits `line` into words in a single left-to-right scan.
///
/// Consecutive delimiters collapse, so the result never contains an empty
/// word. A line made only of delimiters (or an empty line) yields an empty
/// vector. Quotes are ordinary characters: `"a b"` is two words.
pub fn split_into_tokens(line: &str) -> Vec<String> {
    let mut tokens = Vec::with_capacity(INITIAL_CAPACITY);
    let mut start = None;

    for (pos, ch) in line.char_indices() {
        match (is_delimiter(ch), start) {
            (true, Some(begin)) => {
                tokens.push(line[begin..pos].to_string());
                start = None;
            }
            (false, None) => start = Some(pos),
            _ => {}
        }
    }
    if let Some(begin) = start {
        tokens.push(line[begin..].to_string());
    }

    tracing::trace!(?tokens, "tokenized line");
    tokens
}
