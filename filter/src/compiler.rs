//! Turns a free-text search box query into structured clauses plus residual keywords.
//!
//! The grammar is a fixed, ordered list of extractors. Each one looks for its own token in
//! the text left over by the previous extractors, records a [`ClauseValue`] and splices the token
//! out. Nothing here can fail: text no extractor recognises (including malformed dates) simply
//! stays behind as search keywords.

use std::fmt;

use chrono::Local;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Captures;
use regex::Regex;
use tracing::debug;
use tracing::trace;

use crate::clause::ClauseValue;
use crate::clause::DateComparison;
use crate::clause::FilterClauses;
use crate::clause::StatusClause;
use crate::model::ItemKind;

/// Result of compiling one query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledQuery {
    pub clauses: FilterClauses,
    /// Unrecognised remainder, trimmed, as typed.
    pub text: String,
}

impl CompiledQuery {
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty() && self.text.is_empty()
    }

    /// Lowercased residual text, or `None` when there is nothing to search for.
    pub fn needle(&self) -> Option<String> {
        if self.text.is_empty() {
            None
        } else {
            Some(self.text.to_lowercase())
        }
    }
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clauses = self.clauses.to_string();
        match (clauses.is_empty(), self.text.is_empty()) {
            (_, true) => f.write_str(&clauses),
            (true, false) => f.write_str(&self.text),
            (false, false) => write!(f, "{clauses} {}", self.text),
        }
    }
}

/// Compiles `query`, resolving `@me` to `current_username` and `today`/`yesterday` against the
/// local calendar.
pub fn compile(query: &str, current_username: &str) -> CompiledQuery {
    compile_on(query, current_username, Local::now().date_naive())
}

/// Like [`compile`], with relative dates resolved against `today`.
pub fn compile_on(query: &str, current_username: &str, today: NaiveDate) -> CompiledQuery {
    let ctx = CompileContext {
        me: current_username.to_lowercase(),
        today,
    };
    let (clauses, text) = EXTRACTORS.iter().fold(
        (FilterClauses::default(), query.to_string()),
        |(mut clauses, text), extractor| match extractor.extract(&text, &ctx) {
            Some((rest, value)) => {
                trace!(extractor = extractor.name, ?value, "extracted clause");
                clauses.apply(value);
                (clauses, rest)
            }
            None => (clauses, text),
        },
    );
    let compiled = CompiledQuery {
        clauses,
        text: text.trim().to_string(),
    };
    debug!(query, compiled = %compiled, "compiled search query");
    compiled
}

struct CompileContext {
    me: String,
    today: NaiveDate,
}

type ValueFn = fn(&Captures<'_>, &CompileContext) -> Option<ClauseValue>;

struct Extractor {
    name: &'static str,
    regex: Regex,
    value: ValueFn,
}

impl Extractor {
    fn new(name: &'static str, pattern: &str, value: ValueFn) -> Self {
        Self {
            name,
            regex: compile_regex(pattern),
            value,
        }
    }

    /// Returns the text with the first usable token spliced out, and the value it carried.
    /// Tokens whose value cannot be built (`created:2024-13-40`) are skipped and left in place.
    fn extract(&self, text: &str, ctx: &CompileContext) -> Option<(String, ClauseValue)> {
        self.regex.captures_iter(text).find_map(|captures| {
            let value = (self.value)(&captures, ctx)?;
            let token = captures.get(0)?;
            Some((splice_out(text, token.start(), token.end()), value))
        })
    }
}

fn compile_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|err| panic!("invalid regex literal {pattern}: {err}"))
}

/// Removes `text[start..end]` together with the whitespace around it, leaving a single space.
fn splice_out(text: &str, start: usize, end: usize) -> String {
    let head = text[..start].trim_end();
    let tail = text[end..].trim_start();
    format!("{head} {tail}")
}

// Quoted variants must run before their bare counterparts so `\S+` never bites into a quoted
// value. The order is otherwise the order tokens are documented in the panel help.
static EXTRACTORS: Lazy<Vec<Extractor>> = Lazy::new(|| {
    vec![
        Extractor::new("status-open", r"\b(?:is|status):open\b", |_, _| {
            Some(ClauseValue::Status(StatusClause::Open))
        }),
        Extractor::new("status-closed", r"\b(?:is|status):closed\b", |_, _| {
            Some(ClauseValue::Status(StatusClause::Closed))
        }),
        Extractor::new("type-issue", r"\b(?:is|type):issue\b", |_, _| {
            Some(ClauseValue::Type(ItemKind::Issue))
        }),
        Extractor::new("type-comment", r"\b(?:is|type):comment\b", |_, _| {
            Some(ClauseValue::Type(ItemKind::Comment))
        }),
        Extractor::new("type-review", r"\b(?:is|type):(?:cr|review)\b", |_, _| {
            Some(ClauseValue::Type(ItemKind::Review))
        }),
        Extractor::new("author", r"\bauthor:@(\S+)(?:\s|$)", |caps, ctx| {
            Some(ClauseValue::Author(user_value(&caps[1], ctx)))
        }),
        Extractor::new("impacts", r"\bimpacts:@(\S+)(?:\s|$)", |caps, ctx| {
            Some(ClauseValue::Impacts(user_value(&caps[1], ctx)))
        }),
        Extractor::new("assignee", r"\bassignee:@(\S+)(?:\s|$)", |caps, ctx| {
            Some(ClauseValue::Assignee(user_value(&caps[1], ctx)))
        }),
        Extractor::new("reviewer", r"\breviewer:@(\S+)(?:\s|$)", |caps, ctx| {
            Some(ClauseValue::Assignee(user_value(&caps[1], ctx)))
        }),
        Extractor::new("tag-quoted", r#"\btag:"(.*?)"(?:\s|$)"#, |caps, _| {
            Some(ClauseValue::Tag(caps[1].to_string()))
        }),
        Extractor::new("tag-bare", r"\btag:(\S+)(?:\s|$)", |caps, _| {
            Some(ClauseValue::Tag(caps[1].to_string()))
        }),
        Extractor::new("no-tag", r"\bno:tag\b", |_, _| Some(ClauseValue::NoTag)),
        Extractor::new("branch-quoted", r#"\bbranch:"(.*?)"(?:\s|$)"#, |caps, _| {
            Some(ClauseValue::Branch(caps[1].to_string()))
        }),
        Extractor::new("branch-bare", r"\bbranch:(\S+)(?:\s|$)", |caps, _| {
            Some(ClauseValue::Branch(caps[1].to_string()))
        }),
        Extractor::new("commit-quoted", r#"\bcommit:"(.*?)"(?:\s|$)"#, |caps, _| {
            Some(ClauseValue::Commit(caps[1].to_string()))
        }),
        Extractor::new("commit-bare", r"\bcommit:(\S+)(?:\s|$)", |caps, _| {
            Some(ClauseValue::Commit(caps[1].to_string()))
        }),
        Extractor::new("repo-quoted", r#"\brepo:"(.*?)"(?:\s|$)"#, |caps, _| {
            Some(ClauseValue::Repo(caps[1].to_string()))
        }),
        Extractor::new("repo-bare", r"\brepo:(\S+)(?:\s|$)", |caps, _| {
            Some(ClauseValue::Repo(caps[1].to_string()))
        }),
        Extractor::new(
            "updated-date",
            r"\bupdated:([<>]?)([0-9]{4})-([0-9]+)-([0-9]+)(?:\s|$)",
            |caps, _| {
                let day = literal_day(caps)?;
                Some(ClauseValue::Updated(comparison(caps), day))
            },
        ),
        Extractor::new(
            "created-date",
            r"\bcreated:([<>]?)([0-9]{4})-([0-9]+)-([0-9]+)(?:\s|$)",
            |caps, _| {
                let day = literal_day(caps)?;
                Some(ClauseValue::Created(comparison(caps), day))
            },
        ),
        Extractor::new(
            "updated-relative",
            r"\bupdated:([<>]?)(today|yesterday)(?:\s|$)",
            |caps, ctx| {
                let day = relative_day(&caps[2], ctx)?;
                Some(ClauseValue::Updated(comparison(caps), day))
            },
        ),
        Extractor::new(
            "created-relative",
            r"\bcreated:([<>]?)(today|yesterday)(?:\s|$)",
            |caps, ctx| {
                let day = relative_day(&caps[2], ctx)?;
                Some(ClauseValue::Created(comparison(caps), day))
            },
        ),
    ]
});

fn user_value(raw: &str, ctx: &CompileContext) -> String {
    if raw == "me" {
        ctx.me.clone()
    } else {
        raw.to_lowercase()
    }
}

fn comparison(caps: &Captures<'_>) -> DateComparison {
    DateComparison::from_operator(&caps[1])
}

fn literal_day(caps: &Captures<'_>) -> Option<NaiveDate> {
    let year = caps[2].parse().ok()?;
    let month = caps[3].parse().ok()?;
    let day = caps[4].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn relative_day(token: &str, ctx: &CompileContext) -> Option<NaiveDate> {
    match token {
        "today" => Some(ctx.today),
        "yesterday" => ctx.today.pred_opt(),
        _ => None,
    }
}
