//! Dispatching actions against a loaded synchronizer

#[cfg(test)]
mod tests {
    use crate::fixtures::sample_directory;
    use orgdir::io::cache::UI_STATE_CACHE_KEY;
    use orgdir::io::store::{KeyValueStore, MemoryStore};
    use orgdir::services::tree::all_ids;
    use orgdir::{Action, SyncOptions, ViewMode, ViewSynchronizer};
    use std::collections::HashSet;

    fn loaded() -> ViewSynchronizer<MemoryStore> {
        let mut sync = ViewSynchronizer::new(MemoryStore::new(), SyncOptions::default());
        let token = sync.liveness();
        sync.on_data_loaded(&token, sample_directory(), None);
        sync
    }

    fn user_ids(sync: &ViewSynchronizer<MemoryStore>) -> Vec<&str> {
        sync.users().iter().map(|e| e.id.as_str()).collect()
    }

    fn saved_state(sync: &ViewSynchronizer<MemoryStore>) -> serde_json::Value {
        let raw = sync
            .cache()
            .store()
            .get(UI_STATE_CACHE_KEY)
            .unwrap()
            .expect("state saved");
        serde_json::from_str::<serde_json::Value>(&raw).unwrap()["data"].clone()
    }

    #[test]
    fn test_select_org_lists_descendant_employees() {
        let mut sync = loaded();
        sync.dispatch(Action::SelectOrg("D1".to_string()));

        assert_eq!(user_ids(&sync), vec!["e1", "e2", "e3"]);
        assert_eq!(sync.current_org().unwrap().org_id, "D1");
        assert_eq!(saved_state(&sync)["selectedOrgId"], "D1");
    }

    #[test]
    fn test_unknown_org_is_ignored() {
        let mut sync = loaded();
        sync.dispatch(Action::SelectOrg("D2".to_string()));
        sync.dispatch(Action::SelectOrg("NOPE".to_string()));

        assert_eq!(sync.selected_org_id(), Some("D2"));
        assert_eq!(user_ids(&sync), vec!["e4"]);
    }

    #[test]
    fn test_search_and_back() {
        let mut sync = loaded();
        sync.dispatch(Action::SelectOrg("D1".to_string()));
        sync.dispatch(Action::Search {
            category: "user".to_string(),
            term: "park".to_string(),
        });

        assert_eq!(sync.view_mode(), ViewMode::Search);
        assert_eq!(user_ids(&sync), vec!["e3"]);
        assert!(sync.current_org().is_none());
        assert_eq!(sync.selected_org_id(), Some("D1"));
        assert_eq!(saved_state(&sync)["viewMode"], "SEARCH");

        sync.dispatch(Action::Search {
            category: "user".to_string(),
            term: "   ".to_string(),
        });
        assert_eq!(sync.view_mode(), ViewMode::Browse);
        assert_eq!(user_ids(&sync), vec!["e1", "e2", "e3"]);
    }

    #[test]
    fn test_selecting_org_leaves_search_mode() {
        let mut sync = loaded();
        sync.dispatch(Action::Search {
            category: "all".to_string(),
            term: "acme".to_string(),
        });
        sync.dispatch(Action::SelectOrg("T2".to_string()));

        assert_eq!(sync.view_mode(), ViewMode::Browse);
        assert_eq!(user_ids(&sync), vec!["e3"]);
    }

    #[test]
    fn test_company_change_resets_selection_not_checks() {
        let mut sync = loaded();
        sync.dispatch(Action::ToggleCheck("e1".to_string()));
        sync.dispatch(Action::SetCompany("Y".to_string()));

        assert_eq!(sync.company_code(), "Y");
        assert_eq!(sync.forest().roots(), ["C2".to_string()]);
        let expected: HashSet<String> = ["C2".to_string()].into_iter().collect();
        assert_eq!(sync.expanded_ids(), &expected);
        assert!(sync.selected_org_id().is_none());
        assert!(sync.current_org().is_none());
        assert!(sync.users().is_empty());
        assert_eq!(sync.checked_ids(), ["e1".to_string()]);
    }

    #[test]
    fn test_toggle_expand() {
        let mut sync = loaded();
        assert!(!sync.expanded_ids().contains("D1"));
        sync.dispatch(Action::ToggleExpand("D1".to_string()));
        assert!(sync.expanded_ids().contains("D1"));
        sync.dispatch(Action::ToggleExpand("D1".to_string()));
        assert!(!sync.expanded_ids().contains("D1"));

        let ids: HashSet<String> = ["T1".to_string()].into_iter().collect();
        sync.dispatch(Action::SetExpanded(ids.clone()));
        assert_eq!(sync.expanded_ids(), &ids);
    }

    #[test]
    fn test_checks_and_review() {
        let mut sync = loaded();
        sync.dispatch(Action::ToggleCheck("e3".to_string()));
        sync.dispatch(Action::ToggleCheck("e1".to_string()));
        sync.dispatch(Action::ToggleCheck("e5".to_string()));
        assert_eq!(
            sync.checked_emails(),
            vec![
                "park.soo@acme.test".to_string(),
                "kim.minji@acme.test".to_string(),
                "jung.ha@bolt.test".to_string()
            ]
        );

        sync.dispatch(Action::ToggleReview("e3".to_string()));
        sync.dispatch(Action::ToggleReview("e5".to_string()));
        sync.dispatch(Action::ToggleReview("e2".to_string()));
        assert_eq!(sync.review_ids().len(), 2);
        assert!(!sync.review_ids().contains("e2"));

        sync.dispatch(Action::RemoveReviewed);
        assert_eq!(sync.checked_ids(), ["e1".to_string()]);
        assert!(sync.review_ids().is_empty());

        sync.dispatch(Action::ClearChecked);
        assert!(sync.checked_ids().is_empty());
        assert_eq!(saved_state(&sync)["checkedIds"], serde_json::json!([]));
    }

    #[test]
    fn test_unchecking_drops_review_mark() {
        let mut sync = loaded();
        sync.dispatch(Action::ToggleCheck("e2".to_string()));
        sync.dispatch(Action::ToggleReview("e2".to_string()));
        sync.dispatch(Action::ToggleCheck("e2".to_string()));

        assert!(sync.checked_ids().is_empty());
        assert!(sync.review_ids().is_empty());
    }

    #[test]
    fn test_toggle_all_visible() {
        let mut sync = loaded();
        sync.dispatch(Action::SelectOrg("D1".to_string()));
        sync.dispatch(Action::ToggleCheck("e2".to_string()));
        sync.dispatch(Action::ToggleCheck("e5".to_string()));
        assert!(!sync.is_all_visible_checked());

        sync.dispatch(Action::ToggleAllVisible);
        assert!(sync.is_all_visible_checked());
        assert_eq!(
            sync.checked_ids(),
            ["e2".to_string(), "e5".to_string(), "e1".to_string(), "e3".to_string()]
        );

        sync.dispatch(Action::ToggleAllVisible);
        assert_eq!(sync.checked_ids(), ["e5".to_string()]);
    }

    #[test]
    fn test_sidebar_width_is_clamped() {
        let mut sync = loaded();
        sync.dispatch(Action::SetSidebarWidth(100));
        assert_eq!(sync.sidebar_width(), 220);
        sync.dispatch(Action::SetSidebarWidth(1000));
        assert_eq!(sync.sidebar_width(), 400);
        sync.dispatch(Action::SetSidebarWidth(300));
        assert_eq!(sync.sidebar_width(), 300);
        assert_eq!(saved_state(&sync)["sidebarWidth"], 300);
    }

    #[test]
    fn test_department_tree_search_filters_and_expands() {
        let mut sync = loaded();
        let users_before = user_ids(&sync).len();

        sync.dispatch(Action::SetTreeSearchCategory("dept".to_string()));
        sync.dispatch(Action::SetTreeSearchTerm("platform".to_string()));
        assert_eq!(sync.visible_tree().len(), sync.forest().len());

        sync.dispatch(Action::TriggerTreeSearch);
        let visible = sync.visible_tree().into_owned();
        assert_eq!(visible.len(), 3);
        assert_eq!(sync.expanded_ids(), &all_ids(&visible));
        assert_eq!(sync.tree_search().active_term, "platform");
        assert_eq!(user_ids(&sync).len(), users_before);
        assert_eq!(sync.view_mode(), ViewMode::Browse);
    }

    #[test]
    fn test_department_tree_search_matches_ids() {
        let mut sync = loaded();
        sync.dispatch(Action::SetTreeSearchCategory("dept".to_string()));
        sync.dispatch(Action::SetTreeSearchTerm("d3".to_string()));
        sync.dispatch(Action::TriggerTreeSearch);

        assert_eq!(sync.visible_tree().roots(), ["C2".to_string()]);
    }

    #[test]
    fn test_other_tree_search_runs_grid_search() {
        let mut sync = loaded();
        sync.dispatch(Action::SetTreeSearchCategory("user".to_string()));
        sync.dispatch(Action::SetTreeSearchTerm("lee".to_string()));
        sync.dispatch(Action::TriggerTreeSearch);

        assert_eq!(sync.view_mode(), ViewMode::Search);
        assert_eq!(user_ids(&sync), vec!["e2"]);
        assert_eq!(sync.search().term, "lee");
        assert_eq!(sync.visible_tree().len(), sync.forest().len());
    }

    #[test]
    fn test_reveal_employee_opens_path() {
        let mut sync = loaded();
        sync.dispatch(Action::SelectOrg("D2".to_string()));
        sync.dispatch(Action::RevealEmployee("e3".to_string()));

        assert_eq!(sync.selected_org_id(), Some("T2"));
        let expected: HashSet<String> = ["C1", "C2", "D1"].iter().map(|s| s.to_string()).collect();
        assert_eq!(sync.expanded_ids(), &expected);
        assert_eq!(user_ids(&sync), vec!["e4"]);

        sync.dispatch(Action::RevealEmployee("nobody".to_string()));
        assert_eq!(sync.selected_org_id(), Some("T2"));
    }

    #[test]
    fn test_nothing_is_saved_before_load() {
        let mut sync = ViewSynchronizer::new(MemoryStore::new(), SyncOptions::default());
        sync.dispatch(Action::SetSidebarWidth(300));

        assert_eq!(sync.sidebar_width(), 300);
        assert!(sync.cache().store().get(UI_STATE_CACHE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_unknown_search_category_finds_nobody() {
        let mut sync = loaded();
        for category in ["bogus", ""] {
            sync.dispatch(Action::Search {
                category: category.to_string(),
                term: "Kim".to_string(),
            });

            assert_eq!(sync.view_mode(), ViewMode::Search);
            assert!(user_ids(&sync).is_empty(), "category {category:?}");
            assert!(sync.current_org().is_none());
        }
    }

    #[test]
    fn test_tree_wide_search_expands_matching_paths() {
        let mut sync = loaded();
        sync.dispatch(Action::SearchTree {
            term: " park ".to_string(),
        });

        let expected: HashSet<String> = ["C1", "D1", "T2"].iter().map(|s| s.to_string()).collect();
        assert_eq!(sync.expanded_ids(), &expected);
        assert_eq!(
            sync.matched_org_ids(),
            Some(&["T2".to_string()].into_iter().collect::<HashSet<_>>())
        );
        assert!(sync.has_match_in_subtree("C1"));
        assert!(sync.has_match_in_subtree("D1"));
        assert!(!sync.has_match_in_subtree("D2"));
        assert!(!sync.has_match_in_subtree("C2"));
    }

    #[test]
    fn test_tree_wide_search_stays_in_company() {
        let mut sync = loaded();
        sync.dispatch(Action::SetCompany("Y".to_string()));
        sync.dispatch(Action::SearchTree {
            term: "acme.test".to_string(),
        });
        assert_eq!(sync.matched_org_ids().map(HashSet::len), Some(0));
        assert!(sync.expanded_ids().is_empty());

        sync.dispatch(Action::SearchTree {
            term: "bolt.test".to_string(),
        });
        let expected: HashSet<String> = ["C2", "D3"].iter().map(|s| s.to_string()).collect();
        assert_eq!(sync.expanded_ids(), &expected);
    }

    #[test]
    fn test_blank_tree_wide_search_ends_it() {
        let mut sync = loaded();
        sync.dispatch(Action::SearchTree {
            term: "Han".to_string(),
        });
        assert!(sync.matched_org_ids().is_some());

        sync.dispatch(Action::SearchTree {
            term: "  ".to_string(),
        });
        assert!(sync.matched_org_ids().is_none());
        assert!(sync.has_match_in_subtree("C2"));
    }
}
