use mtrace_types::{Keyword, Symbol, Token};

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | '$')
}

/// Convert raw command text into a flat token sequence.
///
/// Total over any input: unrecognized characters become inert
/// [`Token::Unrecognized`] tokens instead of errors, and the scan advances by
/// exactly one character past them so forward progress is guaranteed. The
/// result always ends with exactly one [`Token::End`] sentinel, even for
/// empty input.
///
/// Integer literals are non-negative base-10 `u64` values accumulated with
/// saturating arithmetic; out-of-range literals clamp to `u64::MAX` instead
/// of wrapping or panicking.
pub fn tokenize(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];

        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        // Identifier run: letters, digits, '.', '-', '_', '$', starting
        // with a letter. Reserved spellings become keywords by exact match.
        if c.is_alphabetic() {
            let start = pos;
            while pos < chars.len() && is_ident_char(chars[pos]) {
                pos += 1;
            }
            let spelling: String = chars[start..pos].iter().collect();
            tokens.push(match Keyword::from_spelling(&spelling) {
                Some(keyword) => Token::Keyword(keyword),
                None => Token::Ident(spelling),
            });
            continue;
        }

        if c.is_ascii_digit() {
            let mut value: u64 = 0;
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                let digit = chars[pos].to_digit(10).unwrap_or(0) as u64;
                value = value.saturating_mul(10).saturating_add(digit);
                pos += 1;
            }
            tokens.push(Token::Int(value));
            continue;
        }

        if let Some(symbol) = Symbol::from_char(c) {
            tokens.push(Token::Symbol(symbol));
            pos += 1;
            continue;
        }

        tokens.push(Token::Unrecognized(c));
        pos += 1;
    }

    tokens.push(Token::End);
    tokens
}
