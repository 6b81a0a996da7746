//! Employee search predicates

use crate::models::Employee;
use crate::services::tree::in_partition;
use rayon::prelude::*;
use std::collections::HashSet;

/// Field an employee search matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchCategory {
    #[default]
    User,
    Dept,
    Extension,
    Mobile,
    Position,
    JobTitle,
    Email,
    /// Any of name, department, phone numbers, email, position or role.
    All,
}

impl SearchCategory {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchCategory::User => "user",
            SearchCategory::Dept => "dept",
            SearchCategory::Extension => "extension",
            SearchCategory::Mobile => "mobile",
            SearchCategory::Position => "position",
            SearchCategory::JobTitle => "jobTitle",
            SearchCategory::Email => "email",
            SearchCategory::All => "all",
        }
    }

    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "user" | "name" => Some(SearchCategory::User),
            "dept" | "department" => Some(SearchCategory::Dept),
            "extension" | "ext" => Some(SearchCategory::Extension),
            "mobile" => Some(SearchCategory::Mobile),
            "position" => Some(SearchCategory::Position),
            "jobtitle" | "role" => Some(SearchCategory::JobTitle),
            "email" => Some(SearchCategory::Email),
            "all" => Some(SearchCategory::All),
            _ => None,
        }
    }

    /// Case-insensitive substring test; `needle` must already be lowercase.
    #[must_use]
    pub fn matches(&self, emp: &Employee, needle: &str) -> bool {
        match self {
            SearchCategory::User => hit(&emp.name, needle),
            SearchCategory::Dept => hit(&emp.department, needle),
            SearchCategory::Extension => hit(&emp.extension, needle),
            SearchCategory::Mobile => hit(&emp.mobile, needle),
            SearchCategory::Position => hit(&emp.position, needle),
            SearchCategory::JobTitle => hit(&emp.role, needle),
            SearchCategory::Email => hit(&emp.email, needle),
            SearchCategory::All => [
                &emp.name,
                &emp.department,
                &emp.mobile,
                &emp.extension,
                &emp.email,
                &emp.position,
                &emp.role,
            ]
            .into_iter()
            .any(|value| hit(value, needle)),
        }
    }
}

fn hit(value: &str, needle: &str) -> bool {
    !value.is_empty() && value.to_lowercase().contains(needle)
}

impl std::fmt::Display for SearchCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SearchCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchCategory::from_label(s).ok_or_else(|| format!("unknown search category '{s}'"))
    }
}

/// Employees matching `term` in `category`, in source order.
///
/// A blank term matches nobody.
#[must_use]
pub fn search_employees(
    employees: &[Employee],
    category: SearchCategory,
    term: &str,
) -> Vec<Employee> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    employees
        .par_iter()
        .filter(|emp| category.matches(emp, &needle))
        .cloned()
        .collect()
}

/// Orgs directly holding an employee of `partition` that matches `term` in any field.
///
/// A blank term matches nothing.
#[must_use]
pub fn matched_org_ids(employees: &[Employee], partition: Option<&str>, term: &str) -> HashSet<String> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return HashSet::new();
    }

    employees
        .par_iter()
        .filter(|emp| in_partition(&emp.company_code, partition))
        .filter(|emp| SearchCategory::All.matches(emp, &needle))
        .map(|emp| emp.org_id.clone())
        .collect()
}
