//! Headcount aggregation over the organization forest

use super::tree::{OrgForest, in_partition};
use crate::models::{Employee, OrgTreeNode};
use rayon::prelude::*;
use std::collections::HashMap;

/// Count employees per organization, restricted to `partition`.
#[must_use]
pub fn direct_counts(employees: &[Employee], partition: Option<&str>) -> HashMap<String, u64> {
    employees
        .par_iter()
        .filter(|emp| in_partition(&emp.company_code, partition))
        .fold(HashMap::new, |mut counts: HashMap<String, u64>, emp| {
            *counts.entry(emp.org_id.clone()).or_insert(0) += 1;
            counts
        })
        .reduce(HashMap::new, |mut left, right| {
            for (org_id, count) in right {
                *left.entry(org_id).or_insert(0) += count;
            }
            left
        })
}

/// Total headcount for every node: its direct count plus its children's totals.
///
/// Nodes missing from `direct` count as zero but still get an entry.
#[must_use]
pub fn aggregate_counts(
    forest: &OrgForest,
    direct: &HashMap<String, u64>,
) -> HashMap<String, u64> {
    let mut totals = HashMap::with_capacity(forest.len());
    for root in forest.roots() {
        accumulate(forest, root, direct, &mut totals);
    }
    totals
}

fn accumulate(
    forest: &OrgForest,
    org_id: &str,
    direct: &HashMap<String, u64>,
    totals: &mut HashMap<String, u64>,
) -> u64 {
    let Some(node) = forest.get(org_id) else {
        return 0;
    };

    let mut total = direct.get(org_id).copied().unwrap_or(0);
    for child in &node.children {
        total += accumulate(forest, child, direct, totals);
    }

    totals.insert(org_id.to_string(), total);
    total
}

/// Sort order for sibling nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    SortCode,
    Name,
    Headcount,
}

impl std::str::FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sort" | "code" => Ok(SortBy::SortCode),
            "name" => Ok(SortBy::Name),
            "count" | "headcount" => Ok(SortBy::Headcount),
            _ => Err(format!("unknown sort '{s}'")),
        }
    }
}

/// Sort and limit nodes to top K
#[must_use]
pub fn sort_and_limit<'a>(
    mut nodes: Vec<&'a OrgTreeNode>,
    sort_by: SortBy,
    counts: &HashMap<String, u64>,
    top_k: Option<usize>,
) -> Vec<&'a OrgTreeNode> {
    match sort_by {
        SortBy::SortCode => {
            nodes.sort_by(|a, b| a.unit.sort_code.cmp(&b.unit.sort_code));
        }
        SortBy::Name => {
            nodes.sort_by(|a, b| a.unit.org_name.cmp(&b.unit.org_name));
        }
        SortBy::Headcount => {
            let count = |node: &OrgTreeNode| counts.get(node.id()).copied().unwrap_or(0);
            nodes.sort_by(|a, b| count(b).cmp(&count(a)));
        }
    }

    if let Some(k) = top_k {
        nodes.truncate(k);
    }

    nodes
}

/// Immediate children of `org_id`, explicitly ordered.
#[must_use]
pub fn sorted_children<'a>(
    forest: &'a OrgForest,
    org_id: &str,
    counts: &HashMap<String, u64>,
    sort_by: SortBy,
) -> Vec<&'a OrgTreeNode> {
    sort_and_limit(forest.children(org_id).collect(), sort_by, counts, None)
}
