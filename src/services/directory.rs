//! Session directory: the org list, an id index, and enriched employees

use super::tree::company_options;
use crate::models::{Employee, MISSING_FIELD, OrgUnit, RawDirectory, RawEmployee};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Cached and snapshotted form of a [`Directory`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryData {
    pub org_list: Vec<OrgUnit>,
    pub emp_list: Vec<Employee>,
}

/// Immutable per-session directory snapshot.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    orgs: Vec<OrgUnit>,
    org_map: HashMap<String, OrgUnit>,
    employees: Vec<Employee>,
}

impl Directory {
    /// Build from already-enriched employees.
    #[must_use]
    pub fn new(orgs: Vec<OrgUnit>, employees: Vec<Employee>) -> Self {
        let org_map = orgs
            .iter()
            .map(|org| (org.org_id.clone(), org.clone()))
            .collect();
        Self {
            orgs,
            org_map,
            employees,
        }
    }

    /// Enrich raw employees against the org list.
    ///
    /// `org_full_name` comes from the employee's org when it resolves, and
    /// `company_name` from the name of the company root; the raw values are
    /// the fallback. Blank optional fields become `-`, a blank email stays empty.
    #[must_use]
    pub fn ingest(raw: RawDirectory) -> Self {
        let org_map: HashMap<String, OrgUnit> = raw
            .org_list
            .iter()
            .map(|org| (org.org_id.clone(), org.clone()))
            .collect();
        let companies: HashMap<String, String> =
            company_options(&raw.org_list).into_iter().collect();

        let employees = raw
            .emp_list
            .into_iter()
            .map(|emp| enrich(emp, &org_map, &companies))
            .collect();

        Self {
            orgs: raw.org_list,
            org_map,
            employees,
        }
    }

    #[must_use]
    pub fn from_data(data: DirectoryData) -> Self {
        Self::new(data.org_list, data.emp_list)
    }

    #[must_use]
    pub fn to_data(&self) -> DirectoryData {
        DirectoryData {
            org_list: self.orgs.clone(),
            emp_list: self.employees.clone(),
        }
    }

    #[must_use]
    pub fn orgs(&self) -> &[OrgUnit] {
        &self.orgs
    }

    #[must_use]
    pub fn org_map(&self) -> &HashMap<String, OrgUnit> {
        &self.org_map
    }

    #[must_use]
    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    #[must_use]
    pub fn org(&self, org_id: &str) -> Option<&OrgUnit> {
        self.org_map.get(org_id)
    }

    #[must_use]
    pub fn employee(&self, id: &str) -> Option<&Employee> {
        self.employees.iter().find(|emp| emp.id == id)
    }

    /// Employee whose email equals `email`, ignoring case.
    #[must_use]
    pub fn employee_by_email(&self, email: &str) -> Option<&Employee> {
        if email.is_empty() {
            return None;
        }
        self.employees
            .iter()
            .find(|emp| emp.email.eq_ignore_ascii_case(email))
    }

    /// Employees whose org is in `org_ids`, in source order.
    #[must_use]
    pub fn employees_in(&self, org_ids: &HashSet<String>) -> Vec<Employee> {
        self.employees
            .iter()
            .filter(|emp| org_ids.contains(&emp.org_id))
            .cloned()
            .collect()
    }
}

fn enrich(
    raw: RawEmployee,
    org_map: &HashMap<String, OrgUnit>,
    companies: &HashMap<String, String>,
) -> Employee {
    let org = org_map.get(&raw.org_id);

    let company_code = non_blank(raw.company_code)
        .or_else(|| org.map(|o| o.company_code.clone()))
        .unwrap_or_default();

    let org_full_name = org
        .map(|o| o.org_full_name.clone())
        .filter(|name| !name.is_empty())
        .or_else(|| non_blank(raw.org_full_name))
        .unwrap_or_else(|| MISSING_FIELD.to_string());

    let company_name = companies
        .get(&company_code)
        .cloned()
        .or_else(|| non_blank(raw.company_name))
        .unwrap_or_else(|| company_code.clone());

    Employee {
        id: raw.id,
        name: raw.name,
        position: or_missing(raw.position),
        role: or_missing(raw.role),
        department: non_blank(raw.department)
            .or_else(|| org.map(|o| o.org_name.clone()))
            .unwrap_or_else(|| MISSING_FIELD.to_string()),
        org_full_name,
        org_id: raw.org_id,
        extension: or_missing(raw.extension),
        mobile: or_missing(raw.mobile),
        email: non_blank(raw.email).unwrap_or_default(),
        company_name,
        company_code,
        description: or_missing(raw.description),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn or_missing(value: Option<String>) -> String {
    non_blank(value).unwrap_or_else(|| MISSING_FIELD.to_string())
}
