use crate::clause::quote_if_needed;
use crate::model::TeamTag;

/// One entry of the search panel's "Filters" menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterPreset {
    pub key: &'static str,
    pub label: &'static str,
    pub query: &'static str,
}

pub const PRESETS: &[FilterPreset] = &[
    FilterPreset {
        key: "open",
        label: "Open Issues and Code Reviews",
        query: "is:open",
    },
    FilterPreset {
        key: "issues",
        label: "Your Issues",
        query: "is:issue author:@me",
    },
    FilterPreset {
        key: "reviews",
        label: "Your Code Reviews",
        query: "is:cr author:@me",
    },
    FilterPreset {
        key: "comments",
        label: "Your Code Comments",
        query: "is:comment author:@me",
    },
    FilterPreset {
        key: "assigned",
        label: "Everything assigned to you",
        query: "is:open assignee:@me",
    },
    FilterPreset {
        key: "mycode",
        label: "Everything impacting code you wrote",
        query: "impacts:@me",
    },
];

pub fn preset(key: &str) -> Option<&'static FilterPreset> {
    PRESETS.iter().find(|preset| preset.key == key)
}

/// `tag:` query for a team tag, by label or, for unlabeled tags, by color.
pub fn tag_query(tag: &TeamTag) -> String {
    let value = if tag.label.is_empty() {
        &tag.color
    } else {
        &tag.label
    };
    format!("tag:{}", quote_if_needed(value))
}

pub fn branch_query(branch: &str) -> String {
    format!("branch:\"{branch}\"")
}

pub fn repo_query(repo_name: &str) -> String {
    format!("repo:\"{repo_name}\"")
}
