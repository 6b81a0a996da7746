//! Output formatting for CLI

use crate::io::cache::Clock;
use crate::io::store::KeyValueStore;
use crate::models::{Employee, OrgTreeNode, Presence, ViewMode};
use crate::services::aggregate::{SortBy, sort_and_limit};
use crate::services::presence::PresenceTone;
use crate::services::tree::OrgForest;
use crate::sync::ViewSynchronizer;
use std::collections::{HashMap, HashSet};

/// Reset ANSI color
const COLOR_RESET: &str = "\x1b[0m";
const COLOR_SELECTED: &str = "\x1b[1;36m";

/// Get ANSI color code based on share of the total headcount
fn color_for_share(pct: f64) -> &'static str {
    if pct >= 30.0 {
        "\x1b[31m"
    } else if pct >= 15.0 {
        "\x1b[33m"
    } else if pct >= 5.0 {
        "\x1b[36m"
    } else {
        "\x1b[90m"
    }
}

/// Everything needed to draw the org tree.
pub struct TreeView<'a> {
    pub forest: &'a OrgForest,
    pub counts: &'a HashMap<String, u64>,
    pub expanded: &'a HashSet<String>,
    pub selected: Option<&'a str>,
    pub sort_by: SortBy,
    /// Children shown per expanded node.
    pub top: Option<usize>,
}

impl TreeView<'_> {
    fn count(&self, node: &OrgTreeNode) -> u64 {
        self.counts.get(node.id()).copied().unwrap_or(0)
    }
}

/// Render the expanded part of the tree, one org per line with its headcount.
#[must_use]
pub fn format_tree(view: &TreeView<'_>) -> String {
    let roots = sort_and_limit(
        view.forest.root_nodes().collect(),
        view.sort_by,
        view.counts,
        None,
    );
    if roots.is_empty() {
        return "No organizations found.\n".to_string();
    }

    let total: u64 = roots.iter().map(|node| view.count(node)).sum();
    let mut out = String::new();
    for root in roots {
        write_node(&mut out, view, root, 0, total);
    }
    out
}

fn write_node(out: &mut String, view: &TreeView<'_>, node: &OrgTreeNode, depth: usize, total: u64) {
    let expanded = view.expanded.contains(node.id());
    let marker = match (node.has_children, expanded) {
        (false, _) => "  ",
        (true, true) => "▾ ",
        (true, false) => "▸ ",
    };
    let count = view.count(node);
    #[allow(clippy::cast_precision_loss)]
    let pct = if total > 0 {
        count as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    let color = if view.selected == Some(node.id()) {
        COLOR_SELECTED
    } else {
        color_for_share(pct)
    };

    out.push_str(&format!(
        "{}{marker}{color}{}{COLOR_RESET} ({count})\n",
        "  ".repeat(depth),
        node.unit.org_name,
    ));

    if expanded && node.has_children {
        let children = sort_and_limit(
            view.forest.children(node.id()).collect(),
            view.sort_by,
            view.counts,
            view.top,
        );
        for child in children {
            write_node(out, view, child, depth + 1, total);
        }
    }
}

/// Render pre-computed `(depth, node)` rows in their given order.
#[must_use]
pub fn format_rows(rows: &[(usize, &OrgTreeNode)], counts: &HashMap<String, u64>) -> String {
    let mut out = String::new();
    for (depth, node) in rows {
        let count = counts.get(node.id()).copied().unwrap_or(0);
        out.push_str(&format!(
            "{}{:<12} {} ({count})\n",
            "  ".repeat(*depth),
            node.unit.org_id,
            node.unit.org_name,
        ));
    }
    out
}

/// Employee table. Checked rows are marked, presence is shown as a colored dot.
#[must_use]
pub fn format_employees<'p, F>(employees: &[Employee], checked: &[String], presence: F) -> String
where
    F: Fn(&str) -> Option<&'p Presence>,
{
    if employees.is_empty() {
        return "No employees found.\n".to_string();
    }

    let checked: HashSet<&str> = checked.iter().map(String::as_str).collect();
    let mut out = format!(
        "    {:<16} {:<14} {:<24} {:<10} {}\n{}\n",
        "Name",
        "Position",
        "Department",
        "Ext",
        "Email",
        "─".repeat(92)
    );
    for emp in employees {
        let mark = if checked.contains(emp.id.as_str()) { "[x]" } else { "[ ]" };
        let dot = match presence(&emp.email) {
            Some(p) => format!(
                "{}●{COLOR_RESET}",
                PresenceTone::from_availability(&p.availability).ansi_color()
            ),
            None => " ".to_string(),
        };
        out.push_str(&format!(
            "{mark}{dot}{:<16} {:<14} {:<24} {:<10} {}\n",
            emp.name, emp.position, emp.department, emp.extension, emp.email
        ));
    }
    out
}

/// Human-readable rendering of the synchronizer's current view.
#[must_use]
pub fn format_view_text<S: KeyValueStore, C: Clock>(
    sync: &ViewSynchronizer<S, C>,
    sort_by: SortBy,
    top: Option<usize>,
) -> String {
    let forest = sync.visible_tree();
    let mut out = format!("Company: {}\n\n", sync.company_code());
    out.push_str(&format_tree(&TreeView {
        forest: &forest,
        counts: sync.counts(),
        expanded: sync.expanded_ids(),
        selected: sync.selected_org_id(),
        sort_by,
        top,
    }));
    out.push('\n');

    match (sync.view_mode(), sync.current_org()) {
        (ViewMode::Search, _) => out.push_str(&format!(
            "Search {}: \"{}\" ({} found)\n",
            sync.search().category,
            sync.search().term,
            sync.users().len()
        )),
        (ViewMode::Browse, Some(org)) => out.push_str(&format!(
            "{} ({} employees)\n",
            org.org_full_name,
            sync.users().len()
        )),
        (ViewMode::Browse, None) => {}
    }
    out.push_str(&format_employees(sync.users(), sync.checked_ids(), |email| {
        sync.presence(email)
    }));

    let checked = sync.checked_employees();
    if !checked.is_empty() {
        let names: Vec<&str> = checked.iter().map(|emp| emp.name.as_str()).collect();
        out.push_str(&format!("\nChecked ({}): {}\n", checked.len(), names.join(", ")));
    }
    out
}

/// Machine-readable rendering of the synchronizer's current view.
pub fn format_json<S: KeyValueStore, C: Clock>(
    sync: &ViewSynchronizer<S, C>,
    sort_by: SortBy,
    top: Option<usize>,
) -> String {
    let forest = sync.visible_tree();
    let counts = sync.counts();
    let roots = sort_and_limit(forest.root_nodes().collect(), sort_by, counts, None);
    let tree: Vec<serde_json::Value> = roots
        .into_iter()
        .map(|root| node_json(&forest, root, counts, sync.expanded_ids(), sort_by, top))
        .collect();

    let output = serde_json::json!({
        "state": sync.snapshot(),
        "currentOrg": sync.current_org(),
        "tree": tree,
        "employees": sync.users(),
        "checkedEmails": sync.checked_emails(),
    });

    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

fn node_json(
    forest: &OrgForest,
    node: &OrgTreeNode,
    counts: &HashMap<String, u64>,
    expanded: &HashSet<String>,
    sort_by: SortBy,
    top: Option<usize>,
) -> serde_json::Value {
    let children: Vec<serde_json::Value> = if expanded.contains(node.id()) {
        sort_and_limit(forest.children(node.id()).collect(), sort_by, counts, top)
            .into_iter()
            .map(|child| node_json(forest, child, counts, expanded, sort_by, top))
            .collect()
    } else {
        Vec::new()
    };

    serde_json::json!({
        "orgId": node.unit.org_id,
        "orgName": node.unit.org_name,
        "headcount": counts.get(node.id()).copied().unwrap_or(0),
        "hasChildren": node.has_children,
        "children": children,
    })
}
