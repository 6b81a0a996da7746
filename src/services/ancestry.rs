//! Ancestor and descendant closures over the parent/child relation

use crate::models::OrgUnit;
use std::collections::{HashMap, HashSet, VecDeque};

/// Upper bound on parent hops; malformed data with parent cycles stops here.
pub const MAX_ANCESTOR_HOPS: usize = 100;

/// Resolves an organization by id.
pub trait OrgLookup {
    fn lookup(&self, org_id: &str) -> Option<&OrgUnit>;
}

impl OrgLookup for [OrgUnit] {
    fn lookup(&self, org_id: &str) -> Option<&OrgUnit> {
        self.iter().find(|unit| unit.org_id == org_id)
    }
}

impl OrgLookup for Vec<OrgUnit> {
    fn lookup(&self, org_id: &str) -> Option<&OrgUnit> {
        self.as_slice().lookup(org_id)
    }
}

impl OrgLookup for HashMap<String, OrgUnit> {
    fn lookup(&self, org_id: &str) -> Option<&OrgUnit> {
        self.get(org_id)
    }
}

/// Ids of every ancestor of `target`, excluding `target` itself.
///
/// The walk stops at a unit without a parent, at a parent id that cannot be
/// resolved, or after [`MAX_ANCESTOR_HOPS`] hops.
#[must_use]
pub fn ancestors<L: OrgLookup + ?Sized>(target: &str, lookup: &L) -> HashSet<String> {
    let mut found = HashSet::new();
    let Some(mut current) = lookup.lookup(target) else {
        return found;
    };

    for _ in 0..MAX_ANCESTOR_HOPS {
        let Some(parent_id) = current.parent() else {
            return found;
        };
        let Some(parent) = lookup.lookup(parent_id) else {
            return found;
        };
        if parent.org_id != target {
            found.insert(parent.org_id.clone());
        }
        current = parent;
    }

    log::debug!("Ancestor walk from '{target}' hit the {MAX_ANCESTOR_HOPS} hop cap");
    found
}

/// `target` plus every organization reachable through child links.
///
/// Partitions are ignored: the closure spans the full list.
#[must_use]
pub fn descendants(target: &str, flat: &[OrgUnit]) -> HashSet<String> {
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for unit in flat.iter().filter(|unit| !unit.parent_id.is_empty()) {
        children
            .entry(unit.parent_id.as_str())
            .or_default()
            .push(unit.org_id.as_str());
    }

    let mut found = HashSet::new();
    found.insert(target.to_string());

    let mut queue = VecDeque::from([target]);
    while let Some(current) = queue.pop_front() {
        let Some(kids) = children.get(current) else {
            continue;
        };
        for &child in kids {
            if found.insert(child.to_string()) {
                queue.push_back(child);
            }
        }
    }

    found
}
