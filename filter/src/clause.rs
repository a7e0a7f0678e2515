use std::fmt;

use chrono::NaiveDate;

use crate::model::ItemKind;
use crate::model::ItemStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClause {
    Open,
    Closed,
}

impl StatusClause {
    pub fn matches(self, status: &ItemStatus) -> bool {
        matches!(
            (self, status),
            (StatusClause::Open, ItemStatus::Open) | (StatusClause::Closed, ItemStatus::Closed)
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            StatusClause::Open => "open",
            StatusClause::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateComparison {
    Before,
    After,
    On,
}

impl DateComparison {
    pub(crate) fn from_operator(operator: &str) -> Self {
        match operator {
            "<" => DateComparison::Before,
            ">" => DateComparison::After,
            _ => DateComparison::On,
        }
    }

    const fn operator(self) -> &'static str {
        match self {
            DateComparison::Before => "<",
            DateComparison::After => ">",
            DateComparison::On => "",
        }
    }
}

/// Calendar-day bounds on one timestamp field. All three may be set at once, e.g.
/// `updated:>2024-01-01 updated:<today`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// Strictly before local midnight of this day.
    pub before: Option<NaiveDate>,
    /// At or after local midnight of this day.
    pub after: Option<NaiveDate>,
    /// Anywhere within this local calendar day.
    pub on: Option<NaiveDate>,
}

impl DateRange {
    pub fn is_empty(&self) -> bool {
        self.before.is_none() && self.after.is_none() && self.on.is_none()
    }

    pub(crate) fn set(&mut self, comparison: DateComparison, day: NaiveDate) {
        match comparison {
            DateComparison::Before => self.before = Some(day),
            DateComparison::After => self.after = Some(day),
            DateComparison::On => self.on = Some(day),
        }
    }

    fn push_tokens(&self, field: &str, tokens: &mut Vec<String>) {
        let bounds = [
            (DateComparison::After, self.after),
            (DateComparison::Before, self.before),
            (DateComparison::On, self.on),
        ];
        for (comparison, day) in bounds {
            if let Some(day) = day {
                tokens.push(format!(
                    "{field}:{}{}",
                    comparison.operator(),
                    day.format("%Y-%m-%d")
                ));
            }
        }
    }
}

/// One extracted directive, before it is folded into a [`FilterClauses`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClauseValue {
    Status(StatusClause),
    Type(ItemKind),
    Author(String),
    Impacts(String),
    Assignee(String),
    Tag(String),
    NoTag,
    Branch(String),
    Commit(String),
    Repo(String),
    Updated(DateComparison, NaiveDate),
    Created(DateComparison, NaiveDate),
}

/// At most one value per clause kind; a later extraction of the same kind replaces the earlier
/// one. Empty strings (`tag:""`) never constrain anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterClauses {
    pub status: Option<StatusClause>,
    pub item_type: Option<ItemKind>,
    pub author: Option<String>,
    pub impacts: Option<String>,
    pub assignee: Option<String>,
    pub tag: Option<String>,
    pub no_tag: bool,
    pub branch: Option<String>,
    pub commit: Option<String>,
    pub repo: Option<String>,
    pub updated: DateRange,
    pub created: DateRange,
}

impl FilterClauses {
    pub fn apply(&mut self, value: ClauseValue) {
        match value {
            ClauseValue::Status(status) => self.status = Some(status),
            ClauseValue::Type(kind) => self.item_type = Some(kind),
            ClauseValue::Author(author) => replace_non_empty(&mut self.author, author),
            ClauseValue::Impacts(user) => replace_non_empty(&mut self.impacts, user),
            ClauseValue::Assignee(user) => replace_non_empty(&mut self.assignee, user),
            ClauseValue::Tag(tag) => replace_non_empty(&mut self.tag, tag),
            ClauseValue::NoTag => self.no_tag = true,
            ClauseValue::Branch(branch) => replace_non_empty(&mut self.branch, branch),
            ClauseValue::Commit(commit) => replace_non_empty(&mut self.commit, commit),
            ClauseValue::Repo(repo) => replace_non_empty(&mut self.repo, repo),
            ClauseValue::Updated(comparison, day) => self.updated.set(comparison, day),
            ClauseValue::Created(comparison, day) => self.created.set(comparison, day),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn replace_non_empty(slot: &mut Option<String>, value: String) {
    if !value.is_empty() {
        *slot = Some(value);
    }
}

impl FilterClauses {
    fn tokens(&self) -> Vec<String> {
        let mut tokens = Vec::new();
        if let Some(status) = self.status {
            tokens.push(format!("is:{}", status.as_str()));
        }
        if let Some(kind) = self.item_type {
            let token = match kind {
                ItemKind::Review => "cr",
                other => other.as_str(),
            };
            tokens.push(format!("is:{token}"));
        }
        for (key, value) in [
            ("author", &self.author),
            ("impacts", &self.impacts),
            ("assignee", &self.assignee),
        ] {
            if let Some(value) = value {
                tokens.push(format!("{key}:@{value}"));
            }
        }
        if let Some(tag) = &self.tag {
            tokens.push(format!("tag:{}", quote_if_needed(tag)));
        }
        if self.no_tag {
            tokens.push("no:tag".to_string());
        }
        for (key, value) in [
            ("branch", &self.branch),
            ("commit", &self.commit),
            ("repo", &self.repo),
        ] {
            if let Some(value) = value {
                tokens.push(format!("{key}:{}", quote_if_needed(value)));
            }
        }
        self.updated.push_tokens("updated", &mut tokens);
        self.created.push_tokens("created", &mut tokens);
        tokens
    }
}

/// Renders the clauses back into query syntax, in extraction order.
impl fmt::Display for FilterClauses {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens().join(" "))
    }
}

pub(crate) fn quote_if_needed(value: &str) -> String {
    if value.chars().any(char::is_whitespace) {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}
