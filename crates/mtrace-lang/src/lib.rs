pub mod lexer;
pub mod parser;

pub use lexer::tokenize;
pub use parser::parse;

use mtrace_types::Command;

/// Tokenize and parse a raw command line in one step. `None` means the text
/// is not a recognized command; callers log and ignore, never fail.
pub fn parse_line(text: &str) -> Option<Command> {
    parse(&tokenize(text))
}
