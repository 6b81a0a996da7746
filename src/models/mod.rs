//! Data models for organizations, employees, presence and cached view state

use serde::{Deserialize, Serialize};

/// Sentinel partition meaning "every company".
pub const ALL_COMPANIES: &str = "ALL";

/// Placeholder used for employee fields the directory leaves blank.
pub const MISSING_FIELD: &str = "-";

/// A node of the organization hierarchy as delivered by the directory source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgUnit {
    pub org_id: String,
    pub org_name: String,
    #[serde(default)]
    pub org_full_name: String,
    pub org_level: u32,
    #[serde(default)]
    pub parent_id: String,
    #[serde(default)]
    pub sort_code: String,
    #[serde(default)]
    pub company_code: String,
}

impl OrgUnit {
    /// Level 0 units are company roots and carry no parent.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.org_level == 0
    }

    /// Parent id, or `None` for roots and blank parents.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        if self.is_root() || self.parent_id.is_empty() {
            None
        } else {
            Some(self.parent_id.as_str())
        }
    }

    /// Value of a searchable attribute.
    #[must_use]
    pub fn field(&self, field: OrgField) -> &str {
        match field {
            OrgField::OrgId => &self.org_id,
            OrgField::OrgName => &self.org_name,
            OrgField::OrgFullName => &self.org_full_name,
            OrgField::ParentId => &self.parent_id,
            OrgField::SortCode => &self.sort_code,
            OrgField::CompanyCode => &self.company_code,
        }
    }
}

/// String attributes of an [`OrgUnit`] that tree filtering can match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrgField {
    OrgId,
    OrgName,
    OrgFullName,
    ParentId,
    SortCode,
    CompanyCode,
}

/// An [`OrgUnit`] placed in a forest, with the ids of its children in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgTreeNode {
    pub unit: OrgUnit,
    pub children: Vec<String>,
    pub has_children: bool,
}

impl OrgTreeNode {
    #[must_use]
    pub fn new(unit: OrgUnit) -> Self {
        Self {
            unit,
            children: Vec::new(),
            has_children: false,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.unit.org_id
    }
}

/// Employee record after ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub position: String,
    pub role: String,
    pub department: String,
    pub org_full_name: String,
    pub org_id: String,
    pub extension: String,
    pub mobile: String,
    pub email: String,
    pub company_name: String,
    pub company_code: String,
    pub description: String,
}

/// Employee record as delivered by the directory source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEmployee {
    pub id: String,
    pub name: String,
    pub org_id: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub org_full_name: Option<String>,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub company_code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Payload of the directory endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDirectory {
    pub org_list: Vec<OrgUnit>,
    pub emp_list: Vec<RawEmployee>,
}

/// Availability as reported by the presence service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presence {
    pub email: String,
    pub availability: String,
    pub activity: String,
}

/// Which list the employee grid is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewMode {
    #[default]
    Browse,
    Search,
}

/// Grid search fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchState {
    pub term: String,
    pub category: String,
}

/// Tree search fields. `active_term` is the term last submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeSearchState {
    pub term: String,
    pub category: String,
    pub active_term: String,
}

/// Serializable UI state persisted across reloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiStateSnapshot {
    pub view_mode: ViewMode,
    pub company_code: String,
    pub selected_org_id: Option<String>,
    pub expanded_ids: Vec<String>,
    pub checked_ids: Vec<String>,
    pub sidebar_width: u32,
    pub search: SearchState,
    pub tree_search: TreeSearchState,
    pub timestamp: i64,
}

/// Metadata stored alongside a Parquet directory snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub source: String,
    pub exported_at: String,
    pub org_count: u64,
    pub employee_count: u64,
}
