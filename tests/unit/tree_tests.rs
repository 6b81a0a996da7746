//! Unit tests for building the organization forest

#[cfg(test)]
mod tests {
    use crate::fixtures::{minimal_orgs, org, sample_orgs};
    use orgdir::services::tree::{
        OrphanPolicy, all_ids, build_tree, build_tree_with, company_options, root_ids,
    };
    use std::collections::HashSet;

    #[test]
    fn test_minimal_forest() {
        let forest = build_tree(&minimal_orgs(), None);

        assert_eq!(forest.roots(), ["C1".to_string()]);
        let root = forest.get("C1").unwrap();
        assert_eq!(root.children, vec!["D1".to_string()]);
        assert!(root.has_children);
        assert!(!forest.get("D1").unwrap().has_children);
    }

    #[test]
    fn test_all_partition_keeps_every_unit() {
        let orgs = sample_orgs();
        let forest = build_tree(&orgs, Some("ALL"));

        assert_eq!(forest.len(), orgs.len());
        assert_eq!(forest.roots(), ["C1".to_string(), "C2".to_string()]);
        for unit in orgs.iter().filter(|u| u.org_level > 0) {
            let parent = forest.get(&unit.parent_id).unwrap();
            assert!(parent.children.contains(&unit.org_id));
        }
    }

    #[test]
    fn test_partition_excludes_other_companies() {
        let forest = build_tree(&sample_orgs(), Some("Y"));

        assert_eq!(forest.len(), 2);
        assert_eq!(forest.roots(), ["C2".to_string()]);
        assert!(!forest.contains("C1"));
        assert!(!forest.contains("D1"));
    }

    #[test]
    fn test_children_keep_source_order() {
        let forest = build_tree(&sample_orgs(), None);
        let children: Vec<&str> = forest.children("C1").map(|n| n.id()).collect();
        assert_eq!(children, vec!["D1", "D2"]);
        let children: Vec<&str> = forest.children("D1").map(|n| n.id()).collect();
        assert_eq!(children, vec!["T1", "T2"]);
    }

    #[test]
    fn test_orphans_are_dropped_by_default() {
        let orgs = vec![
            org("C1", "Company", 0, "", "01", "X"),
            org("O1", "Orphan", 1, "MISSING", "01", "X"),
            org("O2", "Orphan child", 2, "O1", "01", "X"),
        ];
        let forest = build_tree(&orgs, None);

        assert_eq!(forest.len(), 1);
        assert!(!forest.contains("O1"));
        assert!(!forest.contains("O2"));
    }

    #[test]
    fn test_orphans_can_be_promoted() {
        let orgs = vec![
            org("C1", "Company", 0, "", "01", "X"),
            org("O1", "Orphan", 1, "MISSING", "01", "X"),
            org("O2", "Orphan child", 2, "O1", "01", "X"),
        ];
        let forest = build_tree_with(&orgs, None, OrphanPolicy::PromoteToRoot);

        assert_eq!(forest.roots(), ["C1".to_string(), "O1".to_string()]);
        assert_eq!(forest.get("O1").unwrap().children, vec!["O2".to_string()]);
    }

    #[test]
    fn test_parent_in_other_partition_makes_orphan() {
        let orgs = vec![
            org("C1", "Company", 0, "", "01", "X"),
            org("D1", "Borrowed", 1, "C1", "01", "Y"),
        ];
        let forest = build_tree(&orgs, Some("Y"));
        assert!(forest.is_empty());
    }

    #[test]
    fn test_duplicate_ids_last_wins_first_position() {
        let orgs = vec![
            org("C1", "Company", 0, "", "01", "X"),
            org("D1", "Old name", 1, "C1", "01", "X"),
            org("D2", "Other", 1, "C1", "02", "X"),
            org("D1", "New name", 1, "C1", "01", "X"),
        ];
        let forest = build_tree(&orgs, None);

        assert_eq!(forest.len(), 3);
        assert_eq!(forest.get("D1").unwrap().unit.org_name, "New name");
        assert_eq!(
            forest.get("C1").unwrap().children,
            vec!["D1".to_string(), "D2".to_string()]
        );
    }

    #[test]
    fn test_cycles_are_pruned() {
        let orgs = vec![
            org("C1", "Company", 0, "", "01", "X"),
            org("A", "Loop A", 1, "B", "01", "X"),
            org("B", "Loop B", 1, "A", "01", "X"),
        ];
        let forest = build_tree(&orgs, None);

        assert_eq!(forest.len(), 1);
        assert!(forest.contains("C1"));
    }

    #[test]
    fn test_visible_rows_follow_expansion() {
        let forest = build_tree(&sample_orgs(), None);
        let expanded: HashSet<String> = ["C1".to_string()].into_iter().collect();

        let rows: Vec<(usize, &str)> = forest
            .visible_rows(&expanded)
            .into_iter()
            .map(|(depth, node)| (depth, node.id()))
            .collect();

        assert_eq!(rows, vec![(0, "C1"), (1, "D1"), (1, "D2"), (0, "C2")]);
    }

    #[test]
    fn test_id_helpers() {
        let orgs = sample_orgs();
        let forest = build_tree(&orgs, None);

        let roots = root_ids(&forest);
        assert_eq!(roots.len(), 2);
        assert!(roots.contains("C1") && roots.contains("C2"));
        assert_eq!(all_ids(&forest).len(), orgs.len());

        assert_eq!(
            company_options(&orgs),
            vec![
                ("X".to_string(), "Acme".to_string()),
                ("Y".to_string(), "Bolt".to_string())
            ]
        );
    }
}
