//! Keyword filtering that keeps matches together with their ancestor chains

use super::tree::OrgForest;
use crate::models::{OrgField, OrgTreeNode};
use std::collections::HashMap;

/// Fields matched when the caller does not name any.
pub const DEFAULT_FILTER_FIELDS: [OrgField; 2] = [OrgField::OrgName, OrgField::OrgFullName];

/// Prune `forest` to nodes matching `keyword` and the ancestors leading to them.
///
/// Matching is a case-insensitive substring test on `fields`. A blank keyword
/// returns the forest unchanged. Surviving nodes keep only surviving children,
/// and `has_children` reflects the pruned list.
#[must_use]
pub fn filter_tree(forest: &OrgForest, keyword: &str, fields: Option<&[OrgField]>) -> OrgForest {
    if keyword.trim().is_empty() {
        return forest.clone();
    }

    let needle = keyword.to_lowercase();
    let fields = match fields {
        Some(fields) if !fields.is_empty() => fields,
        _ => &DEFAULT_FILTER_FIELDS[..],
    };

    let mut kept = HashMap::new();
    let roots = forest
        .roots()
        .iter()
        .filter(|root| keep_node(forest, root, &needle, fields, &mut kept))
        .cloned()
        .collect();

    OrgForest::from_parts(roots, kept)
}

fn keep_node(
    forest: &OrgForest,
    org_id: &str,
    needle: &str,
    fields: &[OrgField],
    kept: &mut HashMap<String, OrgTreeNode>,
) -> bool {
    let Some(node) = forest.get(org_id) else {
        return false;
    };

    // Children first so a matching descendant keeps this node alive.
    let children: Vec<String> = node
        .children
        .iter()
        .filter(|child| keep_node(forest, child, needle, fields, kept))
        .cloned()
        .collect();

    let is_match = fields
        .iter()
        .any(|field| node.unit.field(*field).to_lowercase().contains(needle));

    if !is_match && children.is_empty() {
        return false;
    }

    kept.insert(
        org_id.to_string(),
        OrgTreeNode {
            unit: node.unit.clone(),
            has_children: !children.is_empty(),
            children,
        },
    );
    true
}
