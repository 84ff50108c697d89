use mtrace_types::{Command, Keyword, Symbol, Token, TraceOption, TraceTarget};

/// Parse a token sequence into a command.
///
/// Recursive descent over non-owning suffix views of the token slice, with
/// fixed-offset lookahead and no backtracking. `None` signals "unrecognized
/// command"; callers treat it as a no-op plus a logged warning, never a
/// failure. Trailing tokens after a complete command make the whole command
/// unrecognized.
pub fn parse(tokens: &[Token]) -> Option<Command> {
    match tokens.first()? {
        Token::Keyword(Keyword::Clear) => at_end(&tokens[1..]).then_some(Command::Clear),
        Token::Keyword(Keyword::Reset) => at_end(&tokens[1..]).then_some(Command::Reset),
        Token::Keyword(Keyword::Trace) => parse_trace(true, &tokens[1..]),
        Token::Keyword(Keyword::Untrace) => parse_trace(false, &tokens[1..]),
        _ => None,
    }
}

fn at_end(tokens: &[Token]) -> bool {
    matches!(tokens.first(), Some(Token::End))
}

/// `trace`/`untrace` production: an optional option keyword, then a target.
/// When the option keyword is absent the option stays implicit (dispatch
/// treats it as `all`) and the target starts at the same token.
fn parse_trace(enable: bool, tokens: &[Token]) -> Option<Command> {
    let (option, rest) = match tokens.first() {
        Some(Token::Keyword(Keyword::All)) => (Some(TraceOption::All), &tokens[1..]),
        Some(Token::Keyword(Keyword::Count)) => (Some(TraceOption::CallCount), &tokens[1..]),
        Some(Token::Keyword(Keyword::WallTime)) => (Some(TraceOption::WallTime), &tokens[1..]),
        _ => (None, tokens),
    };

    let target = parse_target(rest)?;
    Some(Command::Trace {
        enable,
        option,
        target,
    })
}

fn parse_target(tokens: &[Token]) -> Option<TraceTarget> {
    match tokens.first()? {
        Token::Keyword(Keyword::PsiFinders) => {
            at_end(&tokens[1..]).then_some(TraceTarget::PsiFinders)
        }
        Token::Keyword(Keyword::Tracer) => at_end(&tokens[1..]).then_some(TraceTarget::Tracer),
        Token::Symbol(Symbol::Star) => at_end(&tokens[1..]).then_some(TraceTarget::All),
        Token::Ident(class_name) => parse_class_target(class_name, &tokens[1..]),
        _ => None,
    }
}

fn parse_class_target(class_name: &str, tokens: &[Token]) -> Option<TraceTarget> {
    match tokens.first()? {
        // C*: class wildcard, no '#'.
        Token::Symbol(Symbol::Star) => {
            at_end(&tokens[1..]).then(|| TraceTarget::WildcardClass(class_name.to_string()))
        }
        Token::Symbol(Symbol::Hash) => parse_method_target(class_name, &tokens[1..]),
        // C alone: trace the whole class, method unspecified.
        Token::End => Some(TraceTarget::Method {
            class_name: class_name.to_string(),
            method_name: None,
            param_indexes: None,
        }),
        _ => None,
    }
}

fn parse_method_target(class_name: &str, tokens: &[Token]) -> Option<TraceTarget> {
    match tokens.first()? {
        // C#*: all methods. The empty method name is the sentinel that
        // distinguishes this from the C* form.
        Token::Symbol(Symbol::Star) => at_end(&tokens[1..]).then(|| TraceTarget::WildcardMethod {
            class_name: class_name.to_string(),
            method_name: String::new(),
        }),
        Token::Ident(method_name) => match tokens.get(1)? {
            // C#M*: method-name wildcard.
            Token::Symbol(Symbol::Star) => {
                at_end(&tokens[2..]).then(|| TraceTarget::WildcardMethod {
                    class_name: class_name.to_string(),
                    method_name: method_name.clone(),
                })
            }
            // C#M[i,j,...]: explicit parameter indexes.
            Token::Symbol(Symbol::OpenBracket) => {
                let indexes = parse_param_indexes(&tokens[2..])?;
                Some(TraceTarget::Method {
                    class_name: class_name.to_string(),
                    method_name: Some(method_name.clone()),
                    param_indexes: Some(indexes),
                })
            }
            // C#M: no explicit indexes supplied. Some(vec![]) here, which
            // is distinct from the None of a bare class target.
            Token::End => Some(TraceTarget::Method {
                class_name: class_name.to_string(),
                method_name: Some(method_name.clone()),
                param_indexes: Some(Vec::new()),
            }),
            _ => None,
        },
        _ => None,
    }
}

/// Bracketed parameter list: `Int (, Int)* ]`. At least one integer is
/// required, so `[]` fails the whole command; the unconstrained form is the
/// bracket-less `C#M`. Indexes beyond `u32::MAX` fail the list.
fn parse_param_indexes(tokens: &[Token]) -> Option<Vec<u32>> {
    let mut indexes = Vec::new();
    let mut rest = tokens;

    loop {
        match rest.first()? {
            Token::Int(value) => {
                indexes.push(u32::try_from(*value).ok()?);
                rest = &rest[1..];
            }
            _ => return None,
        }

        match rest.first()? {
            Token::Symbol(Symbol::Comma) => rest = &rest[1..],
            Token::Symbol(Symbol::CloseBracket) => {
                rest = &rest[1..];
                break;
            }
            _ => return None,
        }
    }

    at_end(rest).then_some(indexes)
}
