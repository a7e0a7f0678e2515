use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Lifecycle state as delivered by the service. Anything other than `open`/`closed` is kept
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemStatus {
    Open,
    Closed,
    Other(String),
}

impl ItemStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ItemStatus::Open => "open",
            ItemStatus::Closed => "closed",
            ItemStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for ItemStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "open" => ItemStatus::Open,
            "closed" => ItemStatus::Closed,
            _ => ItemStatus::Other(raw),
        }
    }
}

impl From<ItemStatus> for String {
    fn from(status: ItemStatus) -> Self {
        match status {
            ItemStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Issue,
    Comment,
    Review,
}

impl ItemKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ItemKind::Issue => "issue",
            ItemKind::Comment => "comment",
            ItemKind::Review => "review",
        }
    }
}

/// An issue, code comment or code review as shown in the search panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    pub status: ItemStatus,
    #[serde(default)]
    pub creator_id: Option<String>,
    /// Team tag ids.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub created_at: i64,
    /// Epoch milliseconds.
    #[serde(default)]
    pub modified_at: i64,
    #[serde(default)]
    pub deactivated: bool,
    #[serde(flatten)]
    pub detail: ItemDetail,
}

impl WorkItem {
    pub fn new(id: impl Into<String>, status: ItemStatus, detail: ItemDetail) -> Self {
        Self {
            id: id.into(),
            title: None,
            text: None,
            status,
            creator_id: None,
            tags: Vec::new(),
            created_at: 0,
            modified_at: 0,
            deactivated: false,
            detail,
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self.detail {
            ItemDetail::Issue(_) => ItemKind::Issue,
            ItemDetail::Comment(_) => ItemKind::Comment,
            ItemDetail::Review(_) => ItemKind::Review,
        }
    }

    /// Issue/comment assignees or review reviewers.
    pub fn assignees(&self) -> &[String] {
        match &self.detail {
            ItemDetail::Issue(codemark) | ItemDetail::Comment(codemark) => &codemark.assignees,
            ItemDetail::Review(review) => &review.reviewers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemDetail {
    Issue(CodemarkDetail),
    Comment(CodemarkDetail),
    Review(ReviewDetail),
}

/// Issues and comments are both codemarks anchored to code through markers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodemarkDetail {
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default)]
    pub markers: Vec<Marker>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    #[serde(default)]
    pub branch_when_created: Option<String>,
    #[serde(default)]
    pub commit_hash_when_created: Option<String>,
    #[serde(default)]
    pub repo_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDetail {
    #[serde(default)]
    pub reviewers: Vec<String>,
    #[serde(default)]
    pub review_changesets: Vec<ReviewChangeset>,
    /// Authors of the code under review, keyed by user id.
    #[serde(default)]
    pub authors_by_id: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewChangeset {
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub commits: Vec<ChangesetCommit>,
    #[serde(default)]
    pub repo_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangesetCommit {
    pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repo {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamTag {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub color: String,
}

/// Read-only lookups the matcher resolves ids through. Entries may be missing; an unresolved id
/// never matches anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Directory {
    #[serde(default)]
    pub usernames: HashMap<String, String>,
    #[serde(default)]
    pub repos: HashMap<String, Repo>,
    #[serde(default)]
    pub tags: Vec<TeamTag>,
}

impl Directory {
    /// Lowercased username for `user_id`.
    pub fn username(&self, user_id: &str) -> Option<String> {
        self.usernames
            .get(user_id)
            .map(|username| username.to_lowercase())
    }

    pub fn repo_name(&self, repo_id: &str) -> Option<&str> {
        self.repos.get(repo_id).map(|repo| repo.name.as_str())
    }

    pub fn tag(&self, tag_id: &str) -> Option<&TeamTag> {
        self.tags.iter().find(|tag| tag.id == tag_id)
    }
}
