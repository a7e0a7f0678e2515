use crate::model::CodemarkDetail;
use crate::model::ItemDetail;
use crate::model::ReviewDetail;
use crate::model::WorkItem;

/// The variant-specific values a query can constrain, in one shape for every item kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterableFields<'a> {
    pub assignees: &'a [String],
    /// Users whose code the item touches. Only reviews have any.
    pub impacted: Vec<&'a str>,
    pub branches: Vec<&'a str>,
    pub commits: Vec<&'a str>,
    pub repo_ids: Vec<&'a str>,
}

pub trait FilterableSource {
    fn filterable_fields(&self) -> FilterableFields<'_>;
}

impl FilterableSource for CodemarkDetail {
    fn filterable_fields(&self) -> FilterableFields<'_> {
        FilterableFields {
            assignees: &self.assignees,
            impacted: Vec::new(),
            branches: self
                .markers
                .iter()
                .filter_map(|marker| marker.branch_when_created.as_deref())
                .collect(),
            commits: self
                .markers
                .iter()
                .filter_map(|marker| marker.commit_hash_when_created.as_deref())
                .collect(),
            repo_ids: self
                .markers
                .iter()
                .filter_map(|marker| marker.repo_id.as_deref())
                .collect(),
        }
    }
}

impl FilterableSource for ReviewDetail {
    fn filterable_fields(&self) -> FilterableFields<'_> {
        FilterableFields {
            assignees: &self.reviewers,
            impacted: self.authors_by_id.keys().map(String::as_str).collect(),
            branches: self
                .review_changesets
                .iter()
                .filter_map(|changeset| changeset.branch.as_deref())
                .collect(),
            commits: self
                .review_changesets
                .iter()
                .flat_map(|changeset| changeset.commits.iter())
                .map(|commit| commit.sha.as_str())
                .collect(),
            repo_ids: self
                .review_changesets
                .iter()
                .filter_map(|changeset| changeset.repo_id.as_deref())
                .collect(),
        }
    }
}

impl FilterableSource for ItemDetail {
    fn filterable_fields(&self) -> FilterableFields<'_> {
        match self {
            ItemDetail::Issue(codemark) | ItemDetail::Comment(codemark) => {
                codemark.filterable_fields()
            }
            ItemDetail::Review(review) => review.filterable_fields(),
        }
    }
}

impl FilterableSource for WorkItem {
    fn filterable_fields(&self) -> FilterableFields<'_> {
        self.detail.filterable_fields()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChangesetCommit;
    use crate::model::Marker;
    use crate::model::ReviewChangeset;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    #[test]
    fn review_fields_flatten_changesets() {
        let review = ReviewDetail {
            reviewers: vec!["u2".to_string()],
            review_changesets: vec![
                ReviewChangeset {
                    branch: Some("main".to_string()),
                    commits: vec![
                        ChangesetCommit {
                            sha: "aaa111".to_string(),
                        },
                        ChangesetCommit {
                            sha: "bbb222".to_string(),
                        },
                    ],
                    repo_id: Some("r1".to_string()),
                },
                ReviewChangeset {
                    branch: None,
                    commits: vec![ChangesetCommit {
                        sha: "ccc333".to_string(),
                    }],
                    repo_id: Some("r2".to_string()),
                },
            ],
            authors_by_id: BTreeMap::from([("u9".to_string(), serde_json::Value::Null)]),
        };
        let fields = review.filterable_fields();
        assert_eq!(fields.assignees, ["u2".to_string()]);
        assert_eq!(fields.impacted, vec!["u9"]);
        assert_eq!(fields.branches, vec!["main"]);
        assert_eq!(fields.commits, vec!["aaa111", "bbb222", "ccc333"]);
        assert_eq!(fields.repo_ids, vec!["r1", "r2"]);
    }

    #[test]
    fn codemark_fields_skip_missing_marker_values() {
        let codemark = CodemarkDetail {
            assignees: vec![],
            markers: vec![
                Marker {
                    branch_when_created: Some("feature/x".to_string()),
                    commit_hash_when_created: None,
                    repo_id: Some("r1".to_string()),
                },
                Marker::default(),
            ],
        };
        let fields = codemark.filterable_fields();
        assert_eq!(fields.branches, vec!["feature/x"]);
        assert!(fields.commits.is_empty());
        assert!(fields.impacted.is_empty());
        assert_eq!(fields.repo_ids, vec!["r1"]);
    }
}
