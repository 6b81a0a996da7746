use super::{
    Action, LivenessToken, LoadState, SelectionSet, SyncOptions, clamp_sidebar_width,
};
use crate::Result;
use crate::io::cache::{CacheStore, Clock, Expiry, SystemClock, UI_STATE_CACHE_KEY};
use crate::io::store::KeyValueStore;
use crate::models::{
    Employee, OrgField, OrgUnit, Presence, SearchState, TreeSearchState, UiStateSnapshot,
    ViewMode,
};
use crate::services::aggregate::{aggregate_counts, direct_counts};
use crate::services::ancestry::{ancestors, descendants};
use crate::services::directory::Directory;
use crate::services::filter::filter_tree;
use crate::services::presence::{PresenceSource, PresenceTracker};
use crate::services::search::{SearchCategory, matched_org_ids, search_employees};
use crate::services::tree::{OrgForest, all_ids, build_tree_with, root_ids};
use std::borrow::Cow;
use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

const TREE_FILTER_FIELDS: [OrgField; 2] = [OrgField::OrgName, OrgField::OrgId];

/// Owner of the directory view state.
pub struct ViewSynchronizer<S, C = SystemClock> {
    cache: CacheStore<S, C>,
    options: SyncOptions,
    load: LoadState,
    directory: Directory,
    forest: OrgForest,
    counts: HashMap<String, u64>,
    view_mode: ViewMode,
    company_code: String,
    selected_org_id: Option<String>,
    current_org: Option<OrgUnit>,
    expanded_ids: HashSet<String>,
    checked: SelectionSet,
    review_ids: HashSet<String>,
    sidebar_width: u32,
    search: SearchState,
    tree_search: TreeSearchState,
    users: Vec<Employee>,
    matched_org_ids: Option<HashSet<String>>,
    presence: PresenceTracker,
    alive: Rc<Cell<bool>>,
}

impl<S: KeyValueStore> ViewSynchronizer<S, SystemClock> {
    pub fn new(store: S, options: SyncOptions) -> Self {
        Self::with_cache(CacheStore::new(store), options)
    }
}

impl<S: KeyValueStore, C: Clock> ViewSynchronizer<S, C> {
    pub fn with_cache(cache: CacheStore<S, C>, options: SyncOptions) -> Self {
        Self {
            cache,
            company_code: options.default_company.clone(),
            sidebar_width: clamp_sidebar_width(options.default_sidebar_width),
            options,
            load: LoadState::Loading,
            directory: Directory::default(),
            forest: OrgForest::default(),
            counts: HashMap::new(),
            view_mode: ViewMode::Browse,
            selected_org_id: None,
            current_org: None,
            expanded_ids: HashSet::new(),
            checked: SelectionSet::new(),
            review_ids: HashSet::new(),
            search: SearchState::default(),
            tree_search: TreeSearchState::default(),
            users: Vec::new(),
            matched_org_ids: None,
            presence: PresenceTracker::new(),
            alive: Rc::new(Cell::new(true)),
        }
    }

    /// Token for work that completes after this call returns.
    #[must_use]
    pub fn liveness(&self) -> LivenessToken {
        LivenessToken {
            alive: Rc::clone(&self.alive),
        }
    }

    /// Stop accepting late results and stop persisting.
    pub fn unmount(&mut self) {
        log::debug!("View synchronizer unmounted");
        self.alive.set(false);
    }

    /// Install the loaded directory, then restore the cached view or pick a default one.
    ///
    /// Returns `false` without touching any state when `token` is no longer live.
    pub fn on_data_loaded(
        &mut self,
        token: &LivenessToken,
        directory: Directory,
        current_user_email: Option<&str>,
    ) -> bool {
        if !token.is_live() {
            log::debug!("Ignoring directory load after unmount");
            return false;
        }

        log::info!(
            "Directory ready: {} orgs, {} employees",
            directory.orgs().len(),
            directory.employees().len()
        );
        self.directory = directory;
        self.rebuild_forest();

        let expiry = Expiry::After(self.options.ui_state_ttl);
        let cached = self.cache.get::<UiStateSnapshot>(UI_STATE_CACHE_KEY, expiry);
        match cached {
            Some(snapshot) => self.restore(snapshot, current_user_email),
            None => {
                self.expanded_ids = root_ids(&self.forest);
                self.select_default(current_user_email);
            }
        }

        self.load = LoadState::Ready;
        self.persist();
        true
    }

    pub fn on_load_failed(&mut self, token: &LivenessToken, message: impl Into<String>) -> bool {
        if !token.is_live() {
            return false;
        }
        let message = message.into();
        log::error!("Directory load failed: {message}");
        self.load = LoadState::Failed(message);
        true
    }

    /// Apply `action` and save the resulting state once.
    pub fn dispatch(&mut self, action: Action) {
        log::debug!("Dispatching {action:?}");
        self.apply(action);
        self.persist();
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::SelectOrg(org_id) => {
                self.select_org(&org_id);
            }
            Action::Search { category, term } => {
                self.search = SearchState { term, category };
                self.run_search();
            }
            Action::SetCompany(code) => self.set_company(code),
            Action::ToggleExpand(org_id) => {
                if !self.expanded_ids.remove(&org_id) {
                    self.expanded_ids.insert(org_id);
                }
            }
            Action::SetExpanded(ids) => self.expanded_ids = ids,
            Action::ToggleCheck(emp_id) => {
                if !self.checked.toggle(&emp_id) {
                    self.review_ids.remove(&emp_id);
                }
            }
            Action::ToggleAllVisible => self.toggle_all_visible(),
            Action::ToggleReview(emp_id) => {
                if !self.checked.contains(&emp_id) {
                    log::debug!("Ignoring review toggle for unchecked employee {emp_id}");
                } else if !self.review_ids.remove(&emp_id) {
                    self.review_ids.insert(emp_id);
                }
            }
            Action::RemoveReviewed => {
                for emp_id in self.review_ids.drain() {
                    self.checked.remove(&emp_id);
                }
            }
            Action::ClearChecked => {
                self.checked.clear();
                self.review_ids.clear();
            }
            Action::SetSidebarWidth(width) => self.sidebar_width = clamp_sidebar_width(width),
            Action::SetTreeSearchTerm(term) => self.tree_search.term = term,
            Action::SetTreeSearchCategory(category) => self.tree_search.category = category,
            Action::TriggerTreeSearch => self.trigger_tree_search(),
            Action::RevealEmployee(emp_id) => self.reveal_employee(&emp_id),
            Action::SearchTree { term } => self.search_tree(&term),
        }
    }

    fn restore(&mut self, snapshot: UiStateSnapshot, current_user_email: Option<&str>) {
        log::info!(
            "Restoring view state: {:?}, company {}",
            snapshot.view_mode,
            snapshot.company_code
        );

        if snapshot.company_code != self.company_code {
            self.company_code = snapshot.company_code;
            self.rebuild_forest();
        }
        self.expanded_ids = snapshot.expanded_ids.into_iter().collect();
        self.checked = snapshot.checked_ids.into_iter().collect();
        self.sidebar_width = clamp_sidebar_width(snapshot.sidebar_width);
        self.tree_search = snapshot.tree_search;

        let selected = snapshot
            .selected_org_id
            .filter(|org_id| self.directory.org(org_id).is_some());

        if snapshot.view_mode == ViewMode::Search && !snapshot.search.term.trim().is_empty() {
            self.selected_org_id = selected;
            self.search = snapshot.search;
            self.run_search();
            return;
        }

        match selected {
            Some(org_id) => {
                self.select_org(&org_id);
            }
            None => {
                log::info!("No usable cached selection; choosing a default org");
                self.select_default(current_user_email);
            }
        }
    }

    /// Select the current user's org, else the configured default, else the first root.
    fn select_default(&mut self, current_user_email: Option<&str>) {
        let user_org = current_user_email
            .and_then(|email| self.directory.employee_by_email(email))
            .and_then(|emp| self.directory.org(&emp.org_id))
            .cloned();

        if let Some(org) = user_org {
            log::info!("Selecting the current user's org {}", org.org_id);
            if !org.company_code.is_empty() && org.company_code != self.company_code {
                self.company_code = org.company_code.clone();
                self.rebuild_forest();
            }
            let mut expanded = root_ids(&self.forest);
            expanded.extend(ancestors(&org.org_id, self.directory.org_map()));
            expanded.insert(org.org_id.clone());
            self.expanded_ids = expanded;
            self.select_org(&org.org_id);
            return;
        }

        let fallback = self
            .options
            .default_org_id
            .clone()
            .filter(|org_id| self.directory.org(org_id).is_some())
            .or_else(|| self.forest.roots().first().cloned());

        match fallback {
            Some(org_id) => {
                if self.expanded_ids.is_empty() {
                    self.expanded_ids = root_ids(&self.forest);
                }
                self.expanded_ids
                    .extend(ancestors(&org_id, self.directory.org_map()));
                self.select_org(&org_id);
            }
            None => {
                log::warn!("No organization available to select");
                self.clear_selection();
            }
        }
    }

    fn select_org(&mut self, org_id: &str) -> bool {
        let Some(org) = self.directory.org(org_id).cloned() else {
            log::warn!("Ignoring selection of unknown org {org_id}");
            return false;
        };

        let scope = descendants(org_id, self.directory.orgs());
        self.users = self.directory.employees_in(&scope);
        log::debug!(
            "Selected org {org_id}: {} orgs, {} employees",
            scope.len(),
            self.users.len()
        );
        self.selected_org_id = Some(org_id.to_string());
        self.current_org = Some(org);
        self.view_mode = ViewMode::Browse;
        true
    }

    fn clear_selection(&mut self) {
        self.selected_org_id = None;
        self.current_org = None;
        self.users.clear();
        self.view_mode = ViewMode::Browse;
    }

    fn run_search(&mut self) {
        let term = self.search.term.trim().to_string();
        if term.is_empty() {
            let reselected = match self.selected_org_id.clone() {
                Some(org_id) => self.select_org(&org_id),
                None => false,
            };
            if !reselected {
                self.clear_selection();
            }
            return;
        }

        match SearchCategory::from_label(&self.search.category) {
            Some(category) => {
                self.users = search_employees(self.directory.employees(), category, &term);
                log::debug!(
                    "Search {category} '{term}' matched {} employees",
                    self.users.len()
                );
            }
            None => {
                log::debug!("Unknown search category '{}'", self.search.category);
                self.users.clear();
            }
        }
        self.current_org = None;
        self.view_mode = ViewMode::Search;
    }

    fn search_tree(&mut self, term: &str) {
        let term = term.trim();
        if term.is_empty() {
            self.matched_org_ids = None;
            return;
        }

        let partition = Some(self.company_code.as_str());
        let matched = matched_org_ids(self.directory.employees(), partition, term);
        let mut expanded = HashSet::new();
        for org_id in &matched {
            expanded.extend(ancestors(org_id, self.directory.org_map()));
            expanded.insert(org_id.clone());
        }
        log::debug!(
            "Tree search '{term}' matched {} orgs, expanding {}",
            matched.len(),
            expanded.len()
        );
        self.expanded_ids = expanded;
        self.matched_org_ids = Some(matched);
    }

    fn set_company(&mut self, code: String) {
        log::info!("Switching company to {code}");
        self.company_code = code;
        self.rebuild_forest();
        self.expanded_ids = root_ids(&self.forest);
        self.matched_org_ids = None;
        self.clear_selection();
    }

    fn toggle_all_visible(&mut self) {
        if self.users.is_empty() {
            return;
        }
        if self.is_all_visible_checked() {
            for emp in &self.users {
                self.checked.remove(&emp.id);
                self.review_ids.remove(&emp.id);
            }
        } else {
            for emp in &self.users {
                self.checked.insert(emp.id.clone());
            }
        }
    }

    fn trigger_tree_search(&mut self) {
        let term = self.tree_search.term.trim().to_string();
        self.tree_search.active_term = term.clone();

        if self.tree_search_is_dept() {
            if !term.is_empty() {
                let expanded = all_ids(&self.visible_tree());
                self.expanded_ids = expanded;
            }
            return;
        }

        self.search = SearchState {
            term,
            category: self.tree_search.category.clone(),
        };
        self.run_search();
    }

    fn reveal_employee(&mut self, emp_id: &str) {
        let Some(org_id) = self.directory.employee(emp_id).map(|emp| emp.org_id.clone()) else {
            log::warn!("Cannot reveal unknown employee {emp_id}");
            return;
        };
        let Some(org) = self.directory.org(&org_id) else {
            log::warn!("Employee {emp_id} belongs to unknown org {org_id}");
            return;
        };

        if !self.forest.contains(&org_id) && !org.company_code.is_empty() {
            self.company_code = org.company_code.clone();
            self.rebuild_forest();
        }

        let mut expanded = root_ids(&self.forest);
        expanded.extend(ancestors(&org_id, self.directory.org_map()));
        self.expanded_ids = expanded;
        self.selected_org_id = Some(org_id);
    }

    fn tree_search_is_dept(&self) -> bool {
        SearchCategory::from_label(&self.tree_search.category) == Some(SearchCategory::Dept)
    }

    fn rebuild_forest(&mut self) {
        let partition = Some(self.company_code.as_str());
        self.forest = build_tree_with(self.directory.orgs(), partition, self.options.orphan_policy);
        let direct = direct_counts(self.directory.employees(), partition);
        self.counts = aggregate_counts(&self.forest, &direct);
    }

    fn persist(&mut self) {
        if self.load != LoadState::Ready {
            log::debug!("Skipping state save before the directory is ready");
            return;
        }
        if !self.alive.get() {
            return;
        }
        let snapshot = self.snapshot();
        if !self.cache.set(UI_STATE_CACHE_KEY, &snapshot) {
            log::warn!("View state was not saved");
        }
    }

    /// Current state in its persisted form.
    #[must_use]
    pub fn snapshot(&self) -> UiStateSnapshot {
        let mut expanded_ids: Vec<String> = self.expanded_ids.iter().cloned().collect();
        expanded_ids.sort();
        UiStateSnapshot {
            view_mode: self.view_mode,
            company_code: self.company_code.clone(),
            selected_org_id: self.selected_org_id.clone(),
            expanded_ids,
            checked_ids: self.checked.ids().to_vec(),
            sidebar_width: self.sidebar_width,
            search: self.search.clone(),
            tree_search: self.tree_search.clone(),
            timestamp: self.cache.now_ms(),
        }
    }

    /// The forest as displayed: narrowed by the active department search, if any.
    #[must_use]
    pub fn visible_tree(&self) -> Cow<'_, OrgForest> {
        let term = self.tree_search.active_term.as_str();
        if self.tree_search_is_dept() && !term.trim().is_empty() {
            Cow::Owned(filter_tree(&self.forest, term, Some(&TREE_FILTER_FIELDS[..])))
        } else {
            Cow::Borrowed(&self.forest)
        }
    }

    /// Checked employees in the order they were checked.
    #[must_use]
    pub fn checked_employees(&self) -> Vec<&Employee> {
        self.checked
            .ids()
            .iter()
            .filter_map(|id| self.directory.employee(id))
            .collect()
    }

    #[must_use]
    pub fn checked_emails(&self) -> Vec<String> {
        self.checked_employees()
            .into_iter()
            .filter(|emp| !emp.email.is_empty())
            .map(|emp| emp.email.clone())
            .collect()
    }

    #[must_use]
    pub fn is_all_visible_checked(&self) -> bool {
        !self.users.is_empty() && self.users.iter().all(|emp| self.checked.contains(&emp.id))
    }

    /// Emails whose presence should be requested next, marked as requested.
    ///
    /// Covers the visible list and the checked employees.
    pub fn presence_request(&mut self, incremental: bool) -> Vec<String> {
        let batch = self.pending_presence(incremental);
        self.presence.mark_requested(&batch);
        batch
    }

    fn pending_presence(&self, incremental: bool) -> Vec<String> {
        let emails = self
            .users
            .iter()
            .chain(self.checked_employees())
            .map(|emp| emp.email.as_str());
        self.presence.pending(emails, incremental)
    }

    /// Merge a presence batch unless its requester has gone away.
    pub fn apply_presence(&mut self, token: &LivenessToken, batch: Vec<Presence>) -> bool {
        if !token.is_live() {
            log::debug!("Dropping {} late presence results", batch.len());
            return false;
        }
        self.presence.merge(batch);
        true
    }

    /// Request and merge presence in one step. Returns the number of emails requested.
    ///
    /// Emails count as requested only once the fetch succeeds, so a failed
    /// batch is asked for again by the next incremental refresh.
    pub fn refresh_presence<P>(&mut self, source: &P, incremental: bool) -> Result<usize>
    where
        P: PresenceSource + ?Sized,
    {
        let batch = self.pending_presence(incremental);
        if batch.is_empty() {
            return Ok(0);
        }
        let token = self.liveness();
        let statuses = source.fetch(&batch).map_err(|err| {
            log::warn!("Presence fetch for {} emails failed: {err}", batch.len());
            err
        })?;
        self.presence.mark_requested(&batch);
        self.apply_presence(&token, statuses);
        Ok(batch.len())
    }

    #[must_use]
    pub fn presence(&self, email: &str) -> Option<&Presence> {
        self.presence.get(email)
    }

    #[must_use]
    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    #[must_use]
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// The full forest for the current company.
    #[must_use]
    pub fn forest(&self) -> &OrgForest {
        &self.forest
    }

    #[must_use]
    pub fn counts(&self) -> &HashMap<String, u64> {
        &self.counts
    }

    #[must_use]
    pub fn headcount(&self, org_id: &str) -> u64 {
        self.counts.get(org_id).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    #[must_use]
    pub fn company_code(&self) -> &str {
        &self.company_code
    }

    #[must_use]
    pub fn selected_org_id(&self) -> Option<&str> {
        self.selected_org_id.as_deref()
    }

    #[must_use]
    pub fn current_org(&self) -> Option<&OrgUnit> {
        self.current_org.as_ref()
    }

    #[must_use]
    pub fn expanded_ids(&self) -> &HashSet<String> {
        &self.expanded_ids
    }

    #[must_use]
    pub fn checked_ids(&self) -> &[String] {
        self.checked.ids()
    }

    #[must_use]
    pub fn review_ids(&self) -> &HashSet<String> {
        &self.review_ids
    }

    #[must_use]
    pub fn sidebar_width(&self) -> u32 {
        self.sidebar_width
    }

    #[must_use]
    pub fn search(&self) -> &SearchState {
        &self.search
    }

    #[must_use]
    pub fn tree_search(&self) -> &TreeSearchState {
        &self.tree_search
    }

    /// Orgs directly holding a match of the last tree-wide search; `None` when inactive.
    #[must_use]
    pub fn matched_org_ids(&self) -> Option<&HashSet<String>> {
        self.matched_org_ids.as_ref()
    }

    /// Whether `org_id` or one of its descendants holds a tree-wide search match.
    /// Always true while no such search is active.
    #[must_use]
    pub fn has_match_in_subtree(&self, org_id: &str) -> bool {
        let Some(matched) = &self.matched_org_ids else {
            return true;
        };
        descendants(org_id, self.directory.orgs())
            .iter()
            .any(|id| matched.contains(id))
    }

    /// Employees shown in the grid.
    #[must_use]
    pub fn users(&self) -> &[Employee] {
        &self.users
    }

    #[must_use]
    pub fn cache(&self) -> &CacheStore<S, C> {
        &self.cache
    }

    pub fn into_store(self) -> S {
        self.cache.into_inner()
    }
}
