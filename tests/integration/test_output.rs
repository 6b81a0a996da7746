//! Terminal and JSON rendering of the view

#[cfg(test)]
mod tests {
    use crate::fixtures::sample_directory;
    use orgdir::cli::output::{
        TreeView, format_employees, format_json, format_rows, format_tree, format_view_text,
    };
    use orgdir::io::store::MemoryStore;
    use orgdir::models::Presence;
    use orgdir::services::aggregate::{SortBy, aggregate_counts, direct_counts};
    use orgdir::services::tree::build_tree;
    use orgdir::{Action, SyncOptions, ViewSynchronizer};
    use std::collections::{HashMap, HashSet};

    fn loaded() -> ViewSynchronizer<MemoryStore> {
        let mut sync = ViewSynchronizer::new(MemoryStore::new(), SyncOptions::default());
        let token = sync.liveness();
        sync.on_data_loaded(&token, sample_directory(), None);
        sync
    }

    fn strip_ansi(text: &str) -> String {
        let mut out = String::new();
        let mut in_escape = false;
        for c in text.chars() {
            match (in_escape, c) {
                (false, '\x1b') => in_escape = true,
                (true, 'm') => in_escape = false,
                (true, _) => {}
                (false, c) => out.push(c),
            }
        }
        out
    }

    #[test]
    fn test_tree_shows_expanded_nodes_with_counts() {
        let directory = sample_directory();
        let forest = build_tree(directory.orgs(), None);
        let counts = aggregate_counts(&forest, &direct_counts(directory.employees(), None));
        let expanded: HashSet<String> = ["C1", "D1"].iter().map(|s| s.to_string()).collect();

        let text = strip_ansi(&format_tree(&TreeView {
            forest: &forest,
            counts: &counts,
            expanded: &expanded,
            selected: Some("D1"),
            sort_by: SortBy::Name,
            top: None,
        }));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                "▾ Acme (5)",
                "  ▾ Engineering (3)",
                "      Mobile Apps (1)",
                "      Platform (1)",
                "    Sales (1)",
                "▸ Bolt (1)",
            ]
        );
    }

    #[test]
    fn test_tree_top_limits_children() {
        let directory = sample_directory();
        let forest = build_tree(directory.orgs(), None);
        let counts = HashMap::new();
        let expanded: HashSet<String> = ["C1".to_string()].into_iter().collect();

        let text = strip_ansi(&format_tree(&TreeView {
            forest: &forest,
            counts: &counts,
            expanded: &expanded,
            selected: None,
            sort_by: SortBy::SortCode,
            top: Some(1),
        }));

        assert!(text.contains("Engineering"));
        assert!(!text.contains("Sales"));
    }

    #[test]
    fn test_rows_are_indented() {
        let directory = sample_directory();
        let forest = build_tree(directory.orgs(), Some("Y"));
        let expanded: HashSet<String> = ["C2".to_string()].into_iter().collect();
        let counts: HashMap<String, u64> = [("C2".to_string(), 1)].into_iter().collect();

        let text = format_rows(&forest.visible_rows(&expanded), &counts);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("C2 "));
        assert!(lines[0].ends_with("Bolt (1)"));
        assert!(lines[1].starts_with("  D3 "));
    }

    #[test]
    fn test_employee_table_marks_checked_and_presence() {
        let directory = sample_directory();
        let busy = Presence {
            email: "lee.jun@acme.test".to_string(),
            availability: "Busy".to_string(),
            activity: "InACall".to_string(),
        };
        let text = format_employees(
            &directory.employees()[..2],
            &["e1".to_string()],
            |email| (email == busy.email).then_some(&busy),
        );
        let plain = strip_ansi(&text);

        assert!(plain.lines().any(|l| l.starts_with("[x]") && l.contains("Kim Minji")));
        assert!(plain.lines().any(|l| l.starts_with("[ ]●") && l.contains("Lee Jun")));
        assert_eq!(format_employees(&[], &[], |_| None), "No employees found.\n");
    }

    #[test]
    fn test_view_text_summarizes_selection() {
        let mut sync = loaded();
        sync.dispatch(Action::SelectOrg("D1".to_string()));
        sync.dispatch(Action::ToggleCheck("e2".to_string()));

        let text = strip_ansi(&format_view_text(&sync, SortBy::SortCode, None));
        assert!(text.starts_with("Company: ALL"));
        assert!(text.contains("Engineering (3 employees)"));
        assert!(text.contains("Checked (1): Lee Jun"));
    }

    #[test]
    fn test_json_output_fields() {
        let mut sync = loaded();
        sync.dispatch(Action::Search {
            category: "user".to_string(),
            term: "kim".to_string(),
        });
        sync.dispatch(Action::ToggleCheck("e1".to_string()));

        let value: serde_json::Value =
            serde_json::from_str(&format_json(&sync, SortBy::SortCode, None)).unwrap();

        assert_eq!(value["state"]["viewMode"], "SEARCH");
        assert!(value["currentOrg"].is_null());
        assert_eq!(value["employees"].as_array().unwrap().len(), 2);
        assert_eq!(value["checkedEmails"][0], "kim.minji@acme.test");
        let tree = value["tree"].as_array().unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0]["orgId"], "C1");
        assert_eq!(tree[0]["headcount"], 5);
        assert_eq!(tree[0]["children"].as_array().unwrap().len(), 2);
        assert_eq!(tree[1]["children"][0]["orgId"], "D3");
    }
}
