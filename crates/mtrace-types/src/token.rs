use std::fmt;

/// Reserved spellings of the command language. Matched exactly and
/// case-sensitively against identifier runs; `Trace` and `WallTime` are
/// spelled `trace` and `wall-time` in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Clear,
    Reset,
    Trace,
    Untrace,
    All,
    Count,
    WallTime,
    PsiFinders,
    Tracer,
}

impl Keyword {
    /// Closed reserved-word table. An identifier run that matches one of
    /// these spellings exactly becomes a keyword token instead.
    pub fn from_spelling(text: &str) -> Option<Keyword> {
        match text {
            "clear" => Some(Keyword::Clear),
            "reset" => Some(Keyword::Reset),
            "trace" => Some(Keyword::Trace),
            "untrace" => Some(Keyword::Untrace),
            "all" => Some(Keyword::All),
            "count" => Some(Keyword::Count),
            "wall-time" => Some(Keyword::WallTime),
            "psi-finders" => Some(Keyword::PsiFinders),
            "tracer" => Some(Keyword::Tracer),
            _ => None,
        }
    }

    pub fn spelling(&self) -> &'static str {
        match self {
            Keyword::Clear => "clear",
            Keyword::Reset => "reset",
            Keyword::Trace => "trace",
            Keyword::Untrace => "untrace",
            Keyword::All => "all",
            Keyword::Count => "count",
            Keyword::WallTime => "wall-time",
            Keyword::PsiFinders => "psi-finders",
            Keyword::Tracer => "tracer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Hash,
    Star,
    Comma,
    OpenBracket,
    CloseBracket,
}

impl Symbol {
    pub fn from_char(c: char) -> Option<Symbol> {
        match c {
            '#' => Some(Symbol::Hash),
            '*' => Some(Symbol::Star),
            ',' => Some(Symbol::Comma),
            '[' => Some(Symbol::OpenBracket),
            ']' => Some(Symbol::CloseBracket),
            _ => None,
        }
    }
}

/// One lexical token of a session command.
///
/// Identifier text retains the original character slice, no case folding.
/// Every token sequence produced by the tokenizer ends with exactly one
/// `End` sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Keyword(Keyword),
    Ident(String),
    Int(u64),
    Symbol(Symbol),
    /// A character the scanner has no rule for. Inert: downstream
    /// productions reject it, the tokenizer itself never fails.
    Unrecognized(char),
    End,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Keyword(kw) => write!(f, "{}", kw.spelling()),
            Token::Ident(text) => write!(f, "{}", text),
            Token::Int(value) => write!(f, "{}", value),
            Token::Symbol(Symbol::Hash) => write!(f, "#"),
            Token::Symbol(Symbol::Star) => write!(f, "*"),
            Token::Symbol(Symbol::Comma) => write!(f, ","),
            Token::Symbol(Symbol::OpenBracket) => write!(f, "["),
            Token::Symbol(Symbol::CloseBracket) => write!(f, "]"),
            Token::Unrecognized(c) => write!(f, "{}", c),
            Token::End => write!(f, "<end>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_table_round_trips() {
        for kw in [
            Keyword::Clear,
            Keyword::Reset,
            Keyword::Trace,
            Keyword::Untrace,
            Keyword::All,
            Keyword::Count,
            Keyword::WallTime,
            Keyword::PsiFinders,
            Keyword::Tracer,
        ] {
            assert_eq!(Keyword::from_spelling(kw.spelling()), Some(kw));
        }
    }

    #[test]
    fn test_reserved_table_is_case_sensitive() {
        assert_eq!(Keyword::from_spelling("Clear"), None);
        assert_eq!(Keyword::from_spelling("TRACE"), None);
        assert_eq!(Keyword::from_spelling("Wall-Time"), None);
    }

    #[test]
    fn test_reserved_table_is_exact_match_not_prefix() {
        assert_eq!(Keyword::from_spelling("clearx"), None);
        assert_eq!(Keyword::from_spelling("trac"), None);
    }
}
