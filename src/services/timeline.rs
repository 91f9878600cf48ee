// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity merger and timeline view model.
//!
//! Combines commit buckets with issues and pull requests into one
//! deduplicated, sorted collection with aggregate statistics and a
//! filterable, paginated timeline.

use crate::models::{CommitBuckets, EnrichedCommit, IssueOrPr};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Timeline page size.
pub const PAGE_SIZE: usize = 20;

// ─── Filters ─────────────────────────────────────────────────────────────────

/// Kinds of timeline entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ItemType {
    Commit,
    Issue,
    Pr,
}

impl ItemType {
    pub const ALL: [ItemType; 3] = [ItemType::Commit, ItemType::Issue, ItemType::Pr];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "commit" | "commits" => Some(ItemType::Commit),
            "issue" | "issues" => Some(ItemType::Issue),
            "pr" | "prs" | "pull_request" | "pullrequest" => Some(ItemType::Pr),
            _ => None,
        }
    }
}

/// Set of included item types. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeFilter(BTreeSet<ItemType>);

impl Default for TypeFilter {
    fn default() -> Self {
        Self(ItemType::ALL.into_iter().collect())
    }
}

impl TypeFilter {
    /// Build a filter from the given types; an empty selection means all types.
    pub fn from_types<I: IntoIterator<Item = ItemType>>(types: I) -> Self {
        let set: BTreeSet<ItemType> = types.into_iter().collect();
        if set.is_empty() {
            Self::default()
        } else {
            Self(set)
        }
    }

    /// Flip one type. Turning off the last remaining type does nothing.
    pub fn toggle(&mut self, item_type: ItemType) {
        if self.0.contains(&item_type) {
            if self.0.len() > 1 {
                self.0.remove(&item_type);
            }
        } else {
            self.0.insert(item_type);
        }
    }

    pub fn includes(&self, item_type: ItemType) -> bool {
        self.0.contains(&item_type)
    }

    pub fn types(&self) -> impl Iterator<Item = ItemType> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Timeline filter and page position.
///
/// Any filter change resets the page to 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineQuery {
    pub types: TypeFilter,
    /// `nameWithOwner` of the only repository to show, or `None` for all
    pub repository: Option<String>,
    /// 1-based page index
    pub page: usize,
}

impl Default for TimelineQuery {
    fn default() -> Self {
        Self {
            types: TypeFilter::default(),
            repository: None,
            page: 1,
        }
    }
}

impl TimelineQuery {
    pub fn toggle(&mut self, item_type: ItemType) {
        self.types.toggle(item_type);
        self.page = 1;
    }

    pub fn set_types(&mut self, types: TypeFilter) {
        self.types = types;
        self.page = 1;
    }

    /// Select a single repository; `"all"` or an empty name clears the filter.
    pub fn set_repository(&mut self, repository: Option<&str>) {
        self.repository = repository
            .map(str::trim)
            .filter(|r| !r.is_empty() && *r != ALL_REPOSITORIES)
            .map(str::to_string);
        self.page = 1;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }
}

/// Repository filter value meaning "no repository filter".
pub const ALL_REPOSITORIES: &str = "all";

// ─── Merged view ─────────────────────────────────────────────────────────────

/// One timeline entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "item", rename_all = "lowercase")]
pub enum TimelineItem {
    Commit(EnrichedCommit),
    Issue(IssueOrPr),
    Pr(IssueOrPr),
}

impl TimelineItem {
    pub fn item_type(&self) -> ItemType {
        match self {
            TimelineItem::Commit(_) => ItemType::Commit,
            TimelineItem::Issue(_) => ItemType::Issue,
            TimelineItem::Pr(_) => ItemType::Pr,
        }
    }

    /// Commit date for commits, last update for issues and PRs.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            TimelineItem::Commit(c) => c.committed_date,
            TimelineItem::Issue(i) | TimelineItem::Pr(i) => i.updated_at,
        }
    }

    pub fn repository(&self) -> &str {
        match self {
            TimelineItem::Commit(c) => &c.repository.name_with_owner,
            TimelineItem::Issue(i) | TimelineItem::Pr(i) => &i.repository.name_with_owner,
        }
    }
}

/// Aggregate counts over the merged activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityStats {
    pub total_commits: usize,
    pub total_issues: usize,
    pub total_prs: usize,
    /// Distinct repositories referenced by any commit, issue or PR
    pub repositories: usize,
    /// Distinct (repository, branch) pairs touched by commits
    pub branches: usize,
}

/// One page of the filtered timeline.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePage {
    pub items: Vec<TimelineItem>,
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Deduplicate commits by `oid`, first seen wins across default then other
/// branches, sorted newest first.
pub fn dedup_commits(buckets: &CommitBuckets) -> Vec<EnrichedCommit> {
    let mut seen = HashSet::new();
    let mut commits: Vec<EnrichedCommit> = buckets
        .default_branch
        .iter()
        .chain(&buckets.other_branches)
        .filter(|c| seen.insert(c.oid.as_str()))
        .cloned()
        .collect();
    crate::models::commit::sort_newest_first(&mut commits);
    commits
}

/// Merged commits, issues and PRs, sorted newest first.
#[derive(Debug, Clone, Default)]
pub struct ActivityView {
    items: Vec<TimelineItem>,
    stats: ActivityStats,
    repositories: Vec<String>,
}

impl ActivityView {
    /// Build a view from branch buckets. Branch pairs are counted on the raw
    /// buckets, so a commit seen on two branches counts both.
    pub fn from_buckets(buckets: &CommitBuckets, issues_and_prs: Vec<IssueOrPr>) -> Self {
        let branches: HashSet<(&str, &str)> = buckets
            .default_branch
            .iter()
            .chain(&buckets.other_branches)
            .map(|c| (c.repository.name_with_owner.as_str(), c.branch.as_str()))
            .collect();
        let branch_count = branches.len();

        let mut view = Self::new(dedup_commits(buckets), issues_and_prs);
        view.stats.branches = branch_count;
        view
    }

    /// Build a view from already deduplicated commits (e.g. a stored snapshot).
    ///
    /// Commits are deduplicated again by `oid` so repeated input is harmless.
    pub fn new(commits: Vec<EnrichedCommit>, issues_and_prs: Vec<IssueOrPr>) -> Self {
        let mut seen = HashSet::new();
        let mut branches = HashSet::new();
        let mut repositories = BTreeSet::new();
        let mut stats = ActivityStats::default();
        let mut items = Vec::with_capacity(commits.len() + issues_and_prs.len());

        for commit in commits {
            if !seen.insert(commit.oid.clone()) {
                continue;
            }
            branches.insert((
                commit.repository.name_with_owner.clone(),
                commit.branch.clone(),
            ));
            repositories.insert(commit.repository.name_with_owner.clone());
            stats.total_commits += 1;
            items.push(TimelineItem::Commit(commit));
        }

        for entry in issues_and_prs {
            repositories.insert(entry.repository.name_with_owner.clone());
            if entry.is_pr() {
                stats.total_prs += 1;
                items.push(TimelineItem::Pr(entry));
            } else {
                stats.total_issues += 1;
                items.push(TimelineItem::Issue(entry));
            }
        }

        // Stable sort keeps input order among equal timestamps.
        items.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));

        stats.repositories = repositories.len();
        stats.branches = branches.len();

        Self {
            items,
            stats,
            repositories: repositories.into_iter().collect(),
        }
    }

    pub fn stats(&self) -> &ActivityStats {
        &self.stats
    }

    /// Repository filter options: `all` followed by each repository.
    pub fn repository_options(&self) -> Vec<String> {
        std::iter::once(ALL_REPOSITORIES.to_string())
            .chain(self.repositories.iter().cloned())
            .collect()
    }

    /// Every item passing the query's filters, newest first.
    pub fn filtered<'a>(
        &'a self,
        query: &'a TimelineQuery,
    ) -> impl Iterator<Item = &'a TimelineItem> + 'a {
        self.items.iter().filter(move |item| {
            query.types.includes(item.item_type())
                && query
                    .repository
                    .as_deref()
                    .map_or(true, |repo| item.repository() == repo)
        })
    }

    /// The requested page of the filtered timeline.
    ///
    /// Pages are 1-based; a page past the end is empty.
    pub fn page(&self, query: &TimelineQuery) -> TimelinePage {
        let filtered: Vec<&TimelineItem> = self.filtered(query).collect();
        let total_items = filtered.len();
        let page = query.page.max(1);
        let start = (page - 1).saturating_mul(PAGE_SIZE);

        let items = filtered
            .into_iter()
            .skip(start)
            .take(PAGE_SIZE)
            .cloned()
            .collect();

        TimelinePage {
            items,
            page,
            per_page: PAGE_SIZE,
            total_items,
            total_pages: total_items.div_ceil(PAGE_SIZE),
        }
    }
}
