//! Flat organization list to forest conversion
//!
//! The forest is an arena keyed by `org_id`; nodes reference their children by
//! id. Only nodes reachable from a root are kept, so parent cycles and orphaned
//! subtrees never end up in the result.

use crate::models::{ALL_COMPANIES, OrgTreeNode, OrgUnit};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet, VecDeque};

/// What to do with a non-root unit whose parent did not survive partitioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrphanPolicy {
    /// Discard the orphan together with its subtree.
    #[default]
    Drop,
    /// Keep the orphan as an additional root, in encounter order.
    PromoteToRoot,
}

/// Rooted forest of organization nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrgForest {
    roots: Vec<String>,
    nodes: HashMap<String, OrgTreeNode>,
}

impl OrgForest {
    pub(crate) fn from_parts(roots: Vec<String>, nodes: HashMap<String, OrgTreeNode>) -> Self {
        Self { roots, nodes }
    }

    /// Root ids in encounter order.
    #[must_use]
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    #[must_use]
    pub fn get(&self, org_id: &str) -> Option<&OrgTreeNode> {
        self.nodes.get(org_id)
    }

    #[must_use]
    pub fn contains(&self, org_id: &str) -> bool {
        self.nodes.contains_key(org_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root_nodes(&self) -> impl Iterator<Item = &OrgTreeNode> {
        self.roots.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Children of `org_id` in stored order. Unknown ids yield nothing.
    pub fn children(&self, org_id: &str) -> impl Iterator<Item = &OrgTreeNode> {
        self.nodes
            .get(org_id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.nodes.get(id))
    }

    /// Pre-order rows `(depth, node)`, descending only into expanded nodes.
    #[must_use]
    pub fn visible_rows(&self, expanded: &HashSet<String>) -> Vec<(usize, &OrgTreeNode)> {
        let mut rows = Vec::new();
        for root in self.root_nodes() {
            self.push_rows(root, 0, expanded, &mut rows);
        }
        rows
    }

    fn push_rows<'a>(
        &'a self,
        node: &'a OrgTreeNode,
        depth: usize,
        expanded: &HashSet<String>,
        rows: &mut Vec<(usize, &'a OrgTreeNode)>,
    ) {
        rows.push((depth, node));
        if expanded.contains(node.id()) {
            for child in self.children(node.id()) {
                self.push_rows(child, depth + 1, expanded, rows);
            }
        }
    }
}

/// True when `company_code` belongs to the requested partition.
#[must_use]
pub fn in_partition(company_code: &str, partition: Option<&str>) -> bool {
    match partition {
        None | Some(ALL_COMPANIES) => true,
        Some(code) => company_code == code,
    }
}

/// Build a forest from a flat list, dropping orphans.
#[must_use]
pub fn build_tree(flat: &[OrgUnit], partition: Option<&str>) -> OrgForest {
    build_tree_with(flat, partition, OrphanPolicy::Drop)
}

/// Build a forest from a flat list.
///
/// Units outside `partition` are excluded entirely, including as parents.
/// Level-0 units become roots in encounter order; every other unit is attached
/// to its parent's child list in encounter order. When an `org_id` occurs more
/// than once the last record wins but keeps the first record's position.
#[must_use]
pub fn build_tree_with(
    flat: &[OrgUnit],
    partition: Option<&str>,
    orphans: OrphanPolicy,
) -> OrgForest {
    let mut order: Vec<&str> = Vec::with_capacity(flat.len());
    let mut nodes: HashMap<String, OrgTreeNode> = HashMap::with_capacity(flat.len());

    for unit in flat
        .iter()
        .filter(|unit| in_partition(&unit.company_code, partition))
    {
        match nodes.entry(unit.org_id.clone()) {
            Entry::Occupied(mut slot) => {
                slot.insert(OrgTreeNode::new(unit.clone()));
            }
            Entry::Vacant(slot) => {
                order.push(&unit.org_id);
                slot.insert(OrgTreeNode::new(unit.clone()));
            }
        }
    }

    let mut roots = Vec::new();
    let mut links: Vec<(String, String)> = Vec::new();

    for id in order {
        let unit = &nodes[id].unit;
        if unit.is_root() {
            roots.push(id.to_string());
        } else if nodes.contains_key(&unit.parent_id) {
            links.push((unit.parent_id.clone(), id.to_string()));
        } else if orphans == OrphanPolicy::PromoteToRoot {
            log::debug!("Promoting orphan org '{id}' (parent '{}')", unit.parent_id);
            roots.push(id.to_string());
        } else {
            log::debug!("Dropping orphan org '{id}' (parent '{}')", unit.parent_id);
        }
    }

    for (parent, child) in links {
        if let Some(node) = nodes.get_mut(&parent) {
            node.children.push(child);
            node.has_children = true;
        }
    }

    let reachable = reachable_from(&roots, &nodes);
    if reachable.len() < nodes.len() {
        log::debug!(
            "Pruned {} unreachable org nodes",
            nodes.len() - reachable.len()
        );
        nodes.retain(|id, _| reachable.contains(id));
    }

    OrgForest::from_parts(roots, nodes)
}

fn reachable_from(roots: &[String], nodes: &HashMap<String, OrgTreeNode>) -> HashSet<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(nodes.len());
    let mut queue: VecDeque<&str> = roots.iter().map(String::as_str).collect();

    while let Some(id) = queue.pop_front() {
        if !seen.insert(id.to_string()) {
            continue;
        }
        if let Some(node) = nodes.get(id) {
            queue.extend(node.children.iter().map(String::as_str));
        }
    }

    seen
}

/// Ids of the forest roots.
#[must_use]
pub fn root_ids(forest: &OrgForest) -> HashSet<String> {
    forest.roots().iter().cloned().collect()
}

/// Every id in the forest, used to expand a whole filtered tree.
#[must_use]
pub fn all_ids(forest: &OrgForest) -> HashSet<String> {
    forest.nodes.keys().cloned().collect()
}

/// Companies available for partitioning, as `(company_code, root name)`.
#[must_use]
pub fn company_options(flat: &[OrgUnit]) -> Vec<(String, String)> {
    let mut options: Vec<(String, String)> = Vec::new();
    for unit in flat
        .iter()
        .filter(|u| u.is_root() && !u.company_code.is_empty())
    {
        match options.iter_mut().find(|(code, _)| *code == unit.company_code) {
            Some(existing) => existing.1.clone_from(&unit.org_name),
            None => options.push((unit.company_code.clone(), unit.org_name.clone())),
        }
    }
    options
}
