/*!
 * Department and municipality options offered by the search form
 */

use serde::Serialize;

/// A department the service has data for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Department {
    pub id: u32,
    pub name: &'static str,
}

/// A municipality, scoped to its department
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Municipality {
    pub id: u32,
    pub department_id: u32,
    pub name: &'static str,
}

pub const DEPARTMENTS: &[Department] = &[Department { id: 76, name: "Valle del Cauca" }];

pub const MUNICIPALITIES: &[Municipality] = &[Municipality {
    id: 76109,
    department_id: 76,
    name: "Buenaventura",
}];

pub fn departments() -> &'static [Department] {
    DEPARTMENTS
}

/// Municipalities of a department, or every municipality when none is chosen
pub fn municipalities(department_id: Option<u32>) -> Vec<Municipality> {
    MUNICIPALITIES
        .iter()
        .filter(|m| department_id.map_or(true, |d| m.department_id == d))
        .copied()
        .collect()
}

pub fn department_name(id: u32) -> Option<&'static str> {
    DEPARTMENTS.iter().find(|d| d.id == id).map(|d| d.name)
}

pub fn municipality_name(id: u32) -> Option<&'static str> {
    MUNICIPALITIES.iter().find(|m| m.id == id).map(|m| m.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn municipalities_follow_department() {
        assert_eq!(municipalities(Some(76)).len(), 1);
        assert!(municipalities(Some(5)).is_empty());
        assert_eq!(municipalities(None).len(), MUNICIPALITIES.len());
    }

    #[test]
    fn names_resolve() {
        assert_eq!(department_name(76), Some("Valle del Cauca"));
        assert_eq!(municipality_name(76109), Some("Buenaventura"));
        assert_eq!(municipality_name(1), None);
    }
}
