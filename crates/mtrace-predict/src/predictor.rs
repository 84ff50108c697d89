use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use mtrace_lang::{parse, tokenize};
use mtrace_types::{CancelToken, Command, Suggestion};
use std::fmt;
use std::sync::Arc;

const COMMAND_KEYWORDS: [&str; 4] = ["clear", "reset", "trace", "untrace"];
const OPTION_KEYWORDS: [&str; 3] = ["all", "count", "wall-time"];

/// Supplies the corpus for class-name suggestions. The returned snapshot is
/// immutable for the duration of one predict call.
pub trait ClassNameProvider: Send + Sync {
    fn class_names(&self) -> Vec<String>;
}

/// Prediction was aborted by the caller's cancellation token. Partial
/// results are discarded, never returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "prediction cancelled")
    }
}

impl std::error::Error for Cancelled {}

/// Incremental autocomplete for the session command language.
///
/// Prediction runs off the session worker and never touches controller
/// state; its only external input is the class-name snapshot.
pub struct Predictor {
    provider: Arc<dyn ClassNameProvider>,
    matcher: SkimMatcherV2,
}

impl Predictor {
    pub fn new(provider: Arc<dyn ClassNameProvider>) -> Self {
        Self {
            provider,
            matcher: SkimMatcherV2::default(),
        }
    }

    /// Rank completion candidates for the logical token under the cursor.
    ///
    /// `cursor` is a byte offset, the convention of `str::len` and editor
    /// APIs. The input is normalized first: leading whitespace trimmed,
    /// space runs collapsed, words rejoined with single spaces. The cursor
    /// is clamped to the normalized length and back to the nearest char
    /// boundary, so irregular spacing can shift the effective token index
    /// relative to the raw string. The logical token index is the count of
    /// spaces strictly before the clamped cursor.
    ///
    /// Candidate corpus by index: 0 → the command keywords; 1 → the option
    /// keywords, and 2 → known class names, both only when the normalized
    /// input parses to a trace command; any other index → no suggestions.
    pub fn predict(
        &self,
        input: &str,
        cursor: usize,
        cancel: &CancelToken,
    ) -> Result<Vec<Suggestion>, Cancelled> {
        if cancel.is_cancelled() {
            return Err(Cancelled);
        }

        let normalized = normalize(input);
        let token_index = token_index_at(&normalized, cursor);

        let words: Vec<&str> = normalized.split(' ').collect();
        let partial = words.get(token_index).copied().unwrap_or("");

        // Grammatical context comes from parsing the normalized full input.
        // The trailing partial token participates as an ordinary identifier,
        // so "trace coun" is already a trace command with a name-only target.
        let command = parse(&tokenize(&normalized));
        let is_trace = matches!(command, Some(Command::Trace { .. }));

        let candidates: Vec<String> = match token_index {
            0 => COMMAND_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            1 if is_trace => OPTION_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            2 if is_trace => self.provider.class_names(),
            _ => return Ok(Vec::new()),
        };

        self.rank(candidates, partial, cancel)
    }

    fn rank(
        &self,
        candidates: Vec<String>,
        partial: &str,
        cancel: &CancelToken,
    ) -> Result<Vec<Suggestion>, Cancelled> {
        if partial.is_empty() {
            return Ok(candidates.into_iter().map(Suggestion::new).collect());
        }

        let mut scored: Vec<(i64, String)> = Vec::new();
        for candidate in candidates {
            if cancel.is_cancelled() {
                return Err(Cancelled);
            }
            if let Some(score) = self.matcher.fuzzy_match(&candidate, partial) {
                scored.push((score, candidate));
            }
        }

        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        Ok(scored
            .into_iter()
            .map(|(_, name)| Suggestion::new(name))
            .collect())
    }
}

/// Canonical form: leading whitespace trimmed, runs of spaces collapsed,
/// words rejoined with single spaces.
fn normalize(input: &str) -> String {
    input
        .trim_start()
        .split(' ')
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Count of space characters in the normalized input strictly before the
/// byte cursor. A cursor beyond the string length, or inside a multibyte
/// character, clamps down to the nearest char boundary first.
fn token_index_at(normalized: &str, cursor: usize) -> usize {
    let mut end = cursor.min(normalized.len());
    while !normalized.is_char_boundary(end) {
        end -= 1;
    }
    normalized[..end].bytes().filter(|b| *b == b' ').count()
}
