use chrono::NaiveDate;
use chrono::TimeZone;
use chrono::Utc;
use codestream_filter::Bucket;
use codestream_filter::Directory;
use codestream_filter::PartitionedResults;
use codestream_filter::WorkItem;
use codestream_filter::compile_on;
use codestream_filter::evaluate_in;
use pretty_assertions::assert_eq;
use serde_json::json;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
}

fn ms(y: i32, m: u32, d: u32, h: u32) -> i64 {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0)
        .unwrap()
        .timestamp_millis()
}

/// Items as the panel receives them, most recently modified first.
fn items() -> Vec<WorkItem> {
    serde_json::from_value(json!([
        {
            "id": "1",
            "type": "issue",
            "status": "open",
            "title": "Login button misaligned",
            "creatorId": "u2",
            "tags": ["t-bug"],
            "assignees": ["u1"],
            "markers": [{ "branchWhenCreated": "main", "commitHashWhenCreated": "abc123def", "repoId": "r1" }],
            "createdAt": ms(2024, 3, 1, 9),
            "modifiedAt": ms(2024, 3, 10, 8),
        },
        {
            "id": "2",
            "type": "comment",
            "status": "closed",
            "text": "Consider caching the session lookup",
            "creatorId": "u1",
            "markers": [{ "branchWhenCreated": "feature/cache", "repoId": "r2" }],
            "createdAt": ms(2024, 2, 20, 12),
            "modifiedAt": ms(2024, 3, 9, 23),
        },
        {
            "id": "3",
            "type": "review",
            "status": "open",
            "title": "Refactor login flow",
            "creatorId": "u1",
            "reviewers": ["u2"],
            "reviewChangesets": [{
                "branch": "feature/login",
                "commits": [{ "sha": "fedcba987" }],
                "repoId": "r1"
            }],
            "authorsById": { "u3": {} },
            "createdAt": ms(2024, 3, 5, 10),
            "modifiedAt": ms(2024, 3, 5, 10),
        },
        {
            "id": "4",
            "type": "issue",
            "status": "open",
            "title": "Archived login issue",
            "deactivated": true,
            "assignees": ["u1"],
            "createdAt": ms(2024, 1, 1, 0),
            "modifiedAt": ms(2024, 1, 1, 0),
        },
        {
            "id": "5",
            "type": "comment",
            "status": "",
            "text": "Typo in the README",
            "creatorId": "u3",
            "createdAt": ms(2024, 1, 15, 0),
            "modifiedAt": ms(2024, 1, 15, 0),
        }
    ]))
    .unwrap()
}

fn directory() -> Directory {
    serde_json::from_value(json!({
        "usernames": { "u1": "Alice", "u2": "Bob", "u3": "Carol" },
        "repos": { "r1": { "name": "web app" }, "r2": { "name": "api" } },
        "tags": [
            { "id": "t-bug", "label": "bug", "color": "red" },
            { "id": "t-ux", "label": "", "color": "purple" }
        ]
    }))
    .unwrap()
}

fn search(items: &[WorkItem], query: &str) -> PartitionedResults<WorkItem> {
    let compiled = compile_on(query, "Alice", today());
    evaluate_in(items, &compiled, &directory(), "u1", Utc).cloned()
}

fn ids(results: &PartitionedResults<WorkItem>, bucket: Bucket) -> Vec<&str> {
    results
        .bucket(bucket)
        .iter()
        .map(|item| item.id.as_str())
        .collect()
}

#[test]
fn empty_query_partitions_every_active_item() {
    let items = items();
    let results = search(&items, "");
    assert_eq!(ids(&results, Bucket::WaitingForMe), vec!["1"]);
    assert_eq!(ids(&results, Bucket::Open), vec!["3"]);
    assert_eq!(ids(&results, Bucket::Closed), vec!["2"]);
    assert_eq!(ids(&results, Bucket::Recent), vec!["5"]);
    assert_eq!(results.total(), 4);
}

#[test]
fn open_query_keeps_waiting_for_me_first() {
    let items = items();
    let results = search(&items, "is:open");
    assert_eq!(ids(&results, Bucket::WaitingForMe), vec!["1"]);
    assert_eq!(ids(&results, Bucket::Open), vec!["3"]);
    assert!(results.bucket(Bucket::Closed).is_empty());
    assert_eq!(results.total(), 2);
}

#[test]
fn people_clauses_resolve_through_directory() {
    let items = items();
    assert_eq!(ids(&search(&items, "author:@me"), Bucket::Open), vec!["3"]);
    assert_eq!(ids(&search(&items, "author:@me"), Bucket::Closed), vec!["2"]);
    assert_eq!(
        ids(&search(&items, "assignee:@bob"), Bucket::Open),
        vec!["3"]
    );
    assert_eq!(
        ids(&search(&items, "impacts:@carol is:cr"), Bucket::Open),
        vec!["3"]
    );
    assert!(search(&items, "author:@nobody").is_empty());
}

#[test]
fn code_location_clauses() {
    let items = items();
    assert_eq!(
        ids(&search(&items, "commit:abc"), Bucket::WaitingForMe),
        vec!["1"]
    );
    assert!(search(&items, "commit:def").is_empty());
    assert_eq!(
        ids(&search(&items, "branch:feature/login"), Bucket::Open),
        vec!["3"]
    );

    let web_app = search(&items, r#"repo:"web app""#);
    assert_eq!(web_app.total(), 2);
    assert_eq!(ids(&search(&items, "repo:api"), Bucket::Closed), vec!["2"]);
}

#[test]
fn tag_clauses_match_label_or_color() {
    let items = items();
    assert_eq!(search(&items, "tag:bug").total(), 1);
    assert_eq!(search(&items, "tag:red").total(), 1);
    assert_eq!(search(&items, "tag:Bug").total(), 0);
    assert_eq!(search(&items, "no:tag").total(), 3);
}

#[test]
fn date_clauses_use_calendar_days() {
    let items = items();
    assert_eq!(
        ids(&search(&items, "updated:today"), Bucket::WaitingForMe),
        vec!["1"]
    );
    assert_eq!(
        ids(&search(&items, "updated:yesterday"), Bucket::Closed),
        vec!["2"]
    );
    // After is inclusive of the named day, before is strict.
    assert_eq!(search(&items, "created:>2024-03-05").total(), 1);
    assert_eq!(
        ids(&search(&items, "created:<2024-03-05"), Bucket::Recent),
        vec!["5"]
    );
    assert_eq!(search(&items, "created:<2024-03-05").total(), 3);
    assert_eq!(
        ids(
            &search(&items, "created:>2024-03-01 updated:<2024-03-06"),
            Bucket::Open
        ),
        vec!["3"]
    );
}

#[test]
fn residual_text_is_case_insensitive() {
    let items = items();
    let results = search(&items, "LOGIN is:open");
    assert_eq!(ids(&results, Bucket::WaitingForMe), vec!["1"]);
    assert_eq!(ids(&results, Bucket::Open), vec!["3"]);
    assert_eq!(search(&items, "session lookup").total(), 1);
    // Deactivated items never show up, even on a text hit.
    assert!(search(&items, "archived").is_empty());
}

#[test]
fn duplicate_items_are_placed_once() {
    let mut items = items();
    items.push(items[0].clone());
    let results = search(&items, "is:open");
    assert_eq!(ids(&results, Bucket::WaitingForMe), vec!["1"]);
    assert_eq!(results.total(), 2);
}

#[test]
fn results_serialize_with_bucket_names() {
    let items = items();
    let results = search(&items, "is:closed");
    let value = serde_json::to_value(&results).unwrap();
    assert_eq!(value["total"], json!(1));
    assert_eq!(value["closed"][0]["id"], json!("2"));
    assert_eq!(value["waitingForMe"], json!([]));
}
