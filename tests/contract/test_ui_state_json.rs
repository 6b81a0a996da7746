//! Persisted UI state matches its JSON shape

#[cfg(test)]
mod tests {
    use orgdir::models::{SearchState, TreeSearchState};
    use orgdir::{UiStateSnapshot, ViewMode};

    fn snapshot() -> UiStateSnapshot {
        UiStateSnapshot {
            view_mode: ViewMode::Search,
            company_code: "X".to_string(),
            selected_org_id: Some("D1".to_string()),
            expanded_ids: vec!["C1".to_string(), "D1".to_string()],
            checked_ids: vec!["e2".to_string()],
            sidebar_width: 300,
            search: SearchState {
                term: "kim".to_string(),
                category: "user".to_string(),
            },
            tree_search: TreeSearchState {
                term: "eng".to_string(),
                category: "dept".to_string(),
                active_term: "eng".to_string(),
            },
            timestamp: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_ui_state_serialization() {
        let value = serde_json::to_value(snapshot()).unwrap();

        assert_eq!(value["viewMode"], "SEARCH");
        assert_eq!(value["companyCode"], "X");
        assert_eq!(value["selectedOrgId"], "D1");
        assert_eq!(value["expandedIds"], serde_json::json!(["C1", "D1"]));
        assert_eq!(value["checkedIds"], serde_json::json!(["e2"]));
        assert_eq!(value["sidebarWidth"], 300);
        assert_eq!(value["search"]["term"], "kim");
        assert_eq!(value["search"]["category"], "user");
        assert_eq!(value["treeSearch"]["activeTerm"], "eng");
        assert_eq!(value["timestamp"], 1_700_000_000_000_i64);
    }

    #[test]
    fn test_ui_state_deserialization() {
        let json = r#"{
            "viewMode": "BROWSE",
            "companyCode": "ALL",
            "selectedOrgId": null,
            "expandedIds": [],
            "checkedIds": ["e1", "e4"],
            "sidebarWidth": 320,
            "search": {"term": "", "category": "user"},
            "treeSearch": {"term": "", "category": "dept", "activeTerm": ""},
            "timestamp": 0
        }"#;

        let state: UiStateSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(state.view_mode, ViewMode::Browse);
        assert_eq!(state.selected_org_id, None);
        assert_eq!(state.checked_ids, vec!["e1".to_string(), "e4".to_string()]);
        assert_eq!(state.tree_search.category, "dept");
    }

    #[test]
    fn test_ui_state_roundtrip_is_lossless() {
        let json = serde_json::to_string(&snapshot()).unwrap();
        let back: UiStateSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot());
    }
}
