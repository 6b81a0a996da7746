use std::collections::HashSet;

/// A discrete state change understood by [`ViewSynchronizer`](super::ViewSynchronizer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Browse an organization and its descendants.
    SelectOrg(String),
    /// Run the grid search; a blank term returns to browsing.
    Search { category: String, term: String },
    /// Switch company partition.
    SetCompany(String),
    ToggleExpand(String),
    SetExpanded(HashSet<String>),
    ToggleCheck(String),
    /// Check every visible employee, or uncheck them all if already checked.
    ToggleAllVisible,
    /// Toggle an employee in the review subset of the checked set.
    ToggleReview(String),
    /// Uncheck every employee in the review subset.
    RemoveReviewed,
    ClearChecked,
    SetSidebarWidth(u32),
    SetTreeSearchTerm(String),
    SetTreeSearchCategory(String),
    /// Submit the tree search box.
    TriggerTreeSearch,
    /// Point the tree at an employee's organization.
    RevealEmployee(String),
    /// Search every field within the company and expand the paths to the
    /// orgs holding a match; a blank term ends the search.
    SearchTree { term: String },
}
