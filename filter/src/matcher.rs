use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use chrono::TimeDelta;
use chrono::TimeZone;

use crate::clause::DateRange;
use crate::clause::FilterClauses;
use crate::compiler::CompiledQuery;
use crate::fields::FilterableFields;
use crate::fields::FilterableSource;
use crate::model::Directory;
use crate::model::WorkItem;

/// Evaluates every clause of one compiled query against single items.
///
/// Clauses are AND-ed. Ids that the [`Directory`] cannot resolve make their predicate fail
/// instead of erroring.
pub(crate) struct ItemMatcher<'q, Tz: TimeZone> {
    clauses: &'q FilterClauses,
    needle: Option<String>,
    directory: &'q Directory,
    tz: Tz,
}

impl<'q, Tz: TimeZone> ItemMatcher<'q, Tz> {
    pub(crate) fn new(compiled: &'q CompiledQuery, directory: &'q Directory, tz: Tz) -> Self {
        Self {
            clauses: &compiled.clauses,
            needle: compiled.needle(),
            directory,
            tz,
        }
    }

    /// Whether `item` satisfies the query. Deactivation is not considered here.
    pub(crate) fn matches(&self, item: &WorkItem) -> bool {
        let clauses = self.clauses;
        let fields = item.filterable_fields();

        if let Some(author) = &clauses.author {
            let creator = item
                .creator_id
                .as_deref()
                .and_then(|id| self.directory.username(id));
            if creator.as_deref() != Some(author.as_str()) {
                return false;
            }
        }
        if let Some(user) = &clauses.impacts
            && !self.any_username(&fields.impacted, user)
        {
            return false;
        }
        if let Some(user) = &clauses.assignee {
            let assignees: Vec<&str> = fields.assignees.iter().map(String::as_str).collect();
            if !self.any_username(&assignees, user) {
                return false;
            }
        }
        if let Some(status) = clauses.status
            && !status.matches(&item.status)
        {
            return false;
        }
        if let Some(tag) = &clauses.tag
            && !self.has_tag(item, tag)
        {
            return false;
        }
        if let Some(kind) = clauses.item_type
            && item.kind() != kind
        {
            return false;
        }
        if clauses.no_tag && !item.tags.is_empty() {
            return false;
        }
        if !self.matches_code_location(&fields) {
            return false;
        }
        if !self.within(item.modified_at, &clauses.updated)
            || !self.within(item.created_at, &clauses.created)
        {
            return false;
        }
        self.matches_text(item)
    }

    fn matches_code_location(&self, fields: &FilterableFields<'_>) -> bool {
        let clauses = self.clauses;
        if let Some(branch) = &clauses.branch
            && !fields.branches.contains(&branch.as_str())
        {
            return false;
        }
        if let Some(prefix) = &clauses.commit
            && !fields
                .commits
                .iter()
                .any(|sha| sha.starts_with(prefix.as_str()))
        {
            return false;
        }
        if let Some(repo) = &clauses.repo
            && !fields
                .repo_ids
                .iter()
                .filter_map(|id| self.directory.repo_name(id))
                .any(|name| name == repo)
        {
            return false;
        }
        true
    }

    fn any_username(&self, user_ids: &[&str], username: &str) -> bool {
        user_ids
            .iter()
            .filter_map(|id| self.directory.username(id))
            .any(|resolved| resolved == username)
    }

    /// Team tags match on label or color, case-sensitively.
    fn has_tag(&self, item: &WorkItem, wanted: &str) -> bool {
        item.tags
            .iter()
            .filter_map(|id| self.directory.tag(id))
            .any(|tag| tag.label == wanted || tag.color == wanted)
    }

    fn within(&self, timestamp_ms: i64, range: &DateRange) -> bool {
        if range.is_empty() {
            return true;
        }
        if let Some(after) = range.after
            && timestamp_ms < self.midnight_ms(after)
        {
            return false;
        }
        if let Some(before) = range.before
            && timestamp_ms >= self.midnight_ms(before)
        {
            return false;
        }
        if let Some(on) = range.on {
            let day = self
                .tz
                .timestamp_millis_opt(timestamp_ms)
                .single()
                .map(|dt| dt.date_naive());
            if day != Some(on) {
                return false;
            }
        }
        true
    }

    fn midnight_ms(&self, day: NaiveDate) -> i64 {
        day_start_ms(day, |local| {
            self.tz
                .from_local_datetime(local)
                .earliest()
                .map(|dt| dt.timestamp_millis())
        })
    }

    fn matches_text(&self, item: &WorkItem) -> bool {
        let Some(needle) = &self.needle else {
            return true;
        };
        [item.title.as_deref(), item.text.as_deref()]
            .into_iter()
            .flatten()
            .any(|haystack| haystack.to_lowercase().contains(needle.as_str()))
    }
}

/// Epoch millis at which `day` starts. When a DST jump skips local midnight the day starts at
/// the first local minute that exists.
fn day_start_ms(day: NaiveDate, resolve: impl Fn(&NaiveDateTime) -> Option<i64>) -> i64 {
    let midnight = day.and_time(NaiveTime::MIN);
    (0..MINUTES_PER_DAY)
        .map(|minute| midnight + TimeDelta::minutes(minute))
        .find_map(|local| resolve(&local))
        .unwrap_or_else(|| midnight.and_utc().timestamp_millis())
}

const MINUTES_PER_DAY: i64 = 24 * 60;
