use std::collections::HashSet;

use chrono::Local;
use chrono::TimeZone;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::compiler::CompiledQuery;
use crate::matcher::ItemMatcher;
use crate::model::Directory;
use crate::model::ItemStatus;
use crate::model::WorkItem;

/// Result section. Every surviving item lands in exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Bucket {
    WaitingForMe,
    Open,
    Closed,
    Recent,
}

impl Bucket {
    /// Assignment order: an item goes to the first bucket it qualifies for.
    pub const PRIORITY: [Bucket; 4] = [
        Bucket::WaitingForMe,
        Bucket::Open,
        Bucket::Closed,
        Bucket::Recent,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Bucket::WaitingForMe => "Open & Assigned to Me",
            Bucket::Open => "Open",
            Bucket::Closed => "Closed",
            Bucket::Recent => "Recent",
        }
    }

    fn accepts(self, item: &WorkItem, current_user_id: &str) -> bool {
        match self {
            Bucket::WaitingForMe => {
                item.status == ItemStatus::Open
                    && item.assignees().iter().any(|id| id == current_user_id)
            }
            Bucket::Open => item.status == ItemStatus::Open,
            Bucket::Closed => item.status == ItemStatus::Closed,
            Bucket::Recent => true,
        }
    }
}

/// Matching items per bucket, each list in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionedResults<T> {
    waiting_for_me: Vec<T>,
    open: Vec<T>,
    closed: Vec<T>,
    recent: Vec<T>,
    total: usize,
}

impl<T> Default for PartitionedResults<T> {
    fn default() -> Self {
        Self {
            waiting_for_me: Vec::new(),
            open: Vec::new(),
            closed: Vec::new(),
            recent: Vec::new(),
            total: 0,
        }
    }
}

impl<T> PartitionedResults<T> {
    pub fn bucket(&self, bucket: Bucket) -> &[T] {
        match bucket {
            Bucket::WaitingForMe => &self.waiting_for_me,
            Bucket::Open => &self.open,
            Bucket::Closed => &self.closed,
            Bucket::Recent => &self.recent,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Buckets in priority order, empty ones included.
    pub fn iter(&self) -> impl Iterator<Item = (Bucket, &[T])> {
        Bucket::PRIORITY
            .into_iter()
            .map(move |bucket| (bucket, self.bucket(bucket)))
    }

    fn push(&mut self, bucket: Bucket, item: T) {
        let slot = match bucket {
            Bucket::WaitingForMe => &mut self.waiting_for_me,
            Bucket::Open => &mut self.open,
            Bucket::Closed => &mut self.closed,
            Bucket::Recent => &mut self.recent,
        };
        slot.push(item);
        self.total += 1;
    }
}

impl<T: Clone> PartitionedResults<&T> {
    pub fn cloned(&self) -> PartitionedResults<T> {
        let mut owned = PartitionedResults::default();
        for (bucket, items) in self.iter() {
            for item in items {
                owned.push(bucket, (*item).clone());
            }
        }
        owned
    }
}

/// Filters `items` with `compiled` and partitions the survivors, using the local time zone for
/// date clauses.
pub fn evaluate<'a>(
    items: &'a [WorkItem],
    compiled: &CompiledQuery,
    directory: &Directory,
    current_user_id: &str,
) -> PartitionedResults<&'a WorkItem> {
    evaluate_in(items, compiled, directory, current_user_id, Local)
}

/// [`evaluate`] with an explicit time zone for calendar-day comparisons.
pub fn evaluate_in<'a, Tz: TimeZone>(
    items: &'a [WorkItem],
    compiled: &CompiledQuery,
    directory: &Directory,
    current_user_id: &str,
    tz: Tz,
) -> PartitionedResults<&'a WorkItem> {
    let matcher = ItemMatcher::new(compiled, directory, tz);
    let mut results = PartitionedResults::default();
    let mut assigned: HashSet<&str> = HashSet::new();
    for item in items {
        if item.deactivated || assigned.contains(item.id.as_str()) {
            continue;
        }
        if !matcher.matches(item) {
            continue;
        }
        let bucket = Bucket::PRIORITY
            .into_iter()
            .find(|bucket| bucket.accepts(item, current_user_id))
            .unwrap_or(Bucket::Recent);
        assigned.insert(item.id.as_str());
        results.push(bucket, item);
    }
    debug!(
        items = items.len(),
        matched = results.total(),
        query = %compiled,
        "evaluated search query"
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_on;
    use crate::model::CodemarkDetail;
    use crate::model::ItemDetail;
    use chrono::NaiveDate;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn issue(id: &str, status: ItemStatus, assignees: &[&str]) -> WorkItem {
        WorkItem::new(
            id,
            status,
            ItemDetail::Issue(CodemarkDetail {
                assignees: assignees.iter().map(|a| (*a).to_string()).collect(),
                markers: Vec::new(),
            }),
        )
    }

    fn run<'a>(items: &'a [WorkItem], query: &str) -> PartitionedResults<&'a WorkItem> {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let compiled = compile_on(query, "alice", today);
        evaluate_in(items, &compiled, &Directory::default(), "u1", Utc)
    }

    fn ids(results: &PartitionedResults<&WorkItem>, bucket: Bucket) -> Vec<String> {
        results
            .bucket(bucket)
            .iter()
            .map(|item| item.id.clone())
            .collect()
    }

    #[test]
    fn open_query_partitions_by_assignment() {
        let items = vec![
            issue("1", ItemStatus::Open, &["u1"]),
            issue("2", ItemStatus::Closed, &[]),
            issue("3", ItemStatus::Open, &[]),
        ];
        let results = run(&items, "is:open");
        assert_eq!(ids(&results, Bucket::WaitingForMe), vec!["1"]);
        assert_eq!(ids(&results, Bucket::Open), vec!["3"]);
        assert!(results.bucket(Bucket::Closed).is_empty());
        assert!(results.bucket(Bucket::Recent).is_empty());
        assert_eq!(results.total(), 2);
    }

    #[test]
    fn closed_and_unknown_statuses() {
        let items = vec![
            issue("1", ItemStatus::Closed, &["u1"]),
            issue("2", ItemStatus::Other("archived".to_string()), &["u1"]),
        ];
        let results = run(&items, "");
        assert_eq!(ids(&results, Bucket::Closed), vec!["1"]);
        assert_eq!(ids(&results, Bucket::Recent), vec!["2"]);
    }

    #[test]
    fn deactivated_items_never_appear() {
        let mut gone = issue("1", ItemStatus::Open, &["u1"]);
        gone.deactivated = true;
        let items = vec![gone, issue("2", ItemStatus::Open, &[])];
        let results = run(&items, "");
        assert_eq!(results.total(), 1);
        assert_eq!(ids(&results, Bucket::Open), vec!["2"]);
    }

    #[test]
    fn duplicate_ids_are_placed_once() {
        let items = vec![
            issue("1", ItemStatus::Open, &[]),
            issue("1", ItemStatus::Closed, &[]),
        ];
        let results = run(&items, "");
        assert_eq!(results.total(), 1);
        assert_eq!(ids(&results, Bucket::Open), vec!["1"]);
    }

    #[test]
    fn bucket_sizes_sum_to_total() {
        let items = vec![
            issue("1", ItemStatus::Open, &["u1"]),
            issue("2", ItemStatus::Open, &["u2"]),
            issue("3", ItemStatus::Closed, &[]),
            issue("4", ItemStatus::Other(String::new()), &[]),
        ];
        let results = run(&items, "");
        let sum: usize = results.iter().map(|(_, items)| items.len()).sum();
        assert_eq!(sum, results.total());
        assert_eq!(results.total(), 4);
    }

    #[test]
    fn cloned_results_keep_partition() {
        let items = vec![issue("1", ItemStatus::Open, &["u1"])];
        let owned = run(&items, "").cloned();
        assert_eq!(owned.bucket(Bucket::WaitingForMe), items.as_slice());
        assert_eq!(owned.total(), 1);
    }

    #[test]
    fn results_serialize_with_bucket_names() {
        let items = vec![issue("1", ItemStatus::Closed, &[])];
        let value = serde_json::to_value(run(&items, "").cloned()).unwrap();
        assert_eq!(value["total"], 1);
        assert_eq!(value["closed"][0]["id"], "1");
        assert_eq!(value["waitingForMe"], serde_json::json!([]));
    }
}
