/*!
 * Cascading filter engine
 *
 * Derives the category → specialty taxonomy from a flat record set and
 * resolves a chosen leaf (a specialty, or a secondary provider class) into a
 * deduplicated list. Every function here is pure and infallible: empty or
 * inconsistent input yields empty or best-effort output.
 */

use std::collections::HashSet;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::data_types::{ProviderClass, ProviderRecord};

/// A (category, specialty) pair with a stable list key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyNode {
    pub index: usize,
    pub specialty: String,
    pub category: String,
}

/// One entry of the specialty result list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEntry {
    pub name: String,
    pub complexity: Option<String>,
}

impl ProviderEntry {
    pub fn display(&self) -> String {
        match &self.complexity {
            Some(tier) => format!("{} ({})", self.name, tier),
            None => self.name.clone(),
        }
    }
}

impl std::fmt::Display for ProviderEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// Keep the first occurrence of each key, preserving order
fn first_seen_by<T, K, F>(items: impl IntoIterator<Item = T>, mut key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(key(item))).collect()
}

/// Distinct specialties in first-seen order, each tied to its first-seen category
pub fn build_taxonomy(records: &[ProviderRecord]) -> Vec<TaxonomyNode> {
    first_seen_by(records, |r| r.specialty.as_str())
        .into_iter()
        .enumerate()
        .map(|(index, r)| TaxonomyNode {
            index,
            specialty: r.specialty.clone(),
            category: r.category.clone(),
        })
        .collect()
}

/// Distinct category labels, first-seen order
pub fn filter_categories(records: &[ProviderRecord]) -> Vec<String> {
    first_seen_by(records.iter().map(|r| r.category.as_str()), |c| *c)
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Taxonomy nodes whose category matches exactly (case-sensitive, untrimmed)
pub fn filter_specialties_by_category<'a>(
    taxonomy: &'a [TaxonomyNode],
    category: &str,
) -> Vec<&'a TaxonomyNode> {
    taxonomy.iter().filter(|node| node.category == category).collect()
}

/// Providers offering a specialty, deduplicated by provider name
///
/// `None` is the unselected state and always yields an empty list. When rows
/// for the same provider carry different complexity tiers, the first row's
/// tier is kept.
pub fn resolve_providers_by_specialty(
    records: &[ProviderRecord],
    specialty: Option<&str>,
) -> Vec<ProviderEntry> {
    let Some(specialty) = specialty else {
        return Vec::new();
    };

    let matching = records.iter().filter(|r| r.specialty == specialty);
    first_seen_by(matching, |r| r.provider_name.as_str())
        .into_iter()
        .map(|r| ProviderEntry {
            name: r.provider_name.clone(),
            complexity: r.complexity_tier().map(str::to_string),
        })
        .collect()
}

/// Rows whose contract flag is set, deduplicated by identifier
///
/// Rows without an identifier are skipped: the identifier is what makes a
/// row selectable.
pub fn resolve_active_by_contract_flag<'a, K, F, I>(
    records: &'a [ProviderRecord],
    flag: F,
    id: I,
) -> Vec<&'a ProviderRecord>
where
    K: Eq + Hash,
    F: Fn(&ProviderRecord) -> bool,
    I: Fn(&ProviderRecord) -> Option<K>,
{
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| flag(*r))
        .filter(|r| id(*r).is_some_and(|key| seen.insert(key)))
        .collect()
}

/// [`resolve_active_by_contract_flag`] for one secondary provider class
pub fn resolve_active_by_class(
    records: &[ProviderRecord],
    class: ProviderClass,
) -> Vec<&ProviderRecord> {
    resolve_active_by_contract_flag(
        records,
        |r| r.secondary(class).active_contract,
        |r| r.secondary(class).id,
    )
}

/// Distinct names of rows flagged as primary provider
pub fn primary_providers(records: &[ProviderRecord]) -> Vec<String> {
    let primary = records.iter().filter(|r| r.is_primary);
    first_seen_by(primary, |r| r.provider_name.as_str())
        .into_iter()
        .map(|r| r.provider_name.clone())
        .collect()
}

pub fn distinct_regions(records: &[ProviderRecord]) -> Vec<String> {
    first_seen_by(records.iter().map(|r| r.region.as_str()), |s| *s)
        .into_iter()
        .map(str::to_string)
        .collect()
}

pub fn distinct_subregions(records: &[ProviderRecord]) -> Vec<String> {
    first_seen_by(records.iter().map(|r| r.subregion.as_str()), |s| *s)
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(provider: &str, category: &str, specialty: &str) -> ProviderRecord {
        ProviderRecord {
            provider_name: provider.to_string(),
            category: category.to_string(),
            specialty: specialty.to_string(),
            ..Default::default()
        }
    }

    fn with_class(id: Option<i64>, active: bool) -> ProviderRecord {
        let mut r = record("Clínica", "General", "Medicina General");
        r.set_secondary(ProviderClass::Complementary, id, Some("Complementario"), active);
        r
    }

    #[test]
    fn test_taxonomy_first_seen_order() {
        let records = vec![
            record("A", "Especialidades", "Pediatría"),
            record("B", "Básica", "Medicina General"),
            record("C", "Especialidades", "Pediatría"),
            record("D", "Especialidades", "Cardiología"),
        ];
        let taxonomy = build_taxonomy(&records);
        let specialties: Vec<_> = taxonomy.iter().map(|n| n.specialty.as_str()).collect();
        assert_eq!(specialties, ["Pediatría", "Medicina General", "Cardiología"]);
        assert_eq!(taxonomy.iter().map(|n| n.index).collect::<Vec<_>>(), [0, 1, 2]);
    }

    #[test]
    fn test_taxonomy_keeps_first_category_on_conflict() {
        let records = vec![
            record("A", "Especialidades", "Cardiología"),
            record("B", "Quirúrgicas", "Cardiología"),
        ];
        let taxonomy = build_taxonomy(&records);
        assert_eq!(taxonomy.len(), 1);
        assert_eq!(taxonomy[0].category, "Especialidades");
    }

    #[test]
    fn test_empty_inputs() {
        assert!(build_taxonomy(&[]).is_empty());
        assert!(filter_categories(&[]).is_empty());
        assert!(resolve_providers_by_specialty(&[], Some("Cardiología")).is_empty());
        assert!(resolve_active_by_class(&[], ProviderClass::Medications).is_empty());
    }

    #[test]
    fn test_categories_are_distinct() {
        let records = vec![
            record("A", "Especialidades", "Cardiología"),
            record("B", "Básica", "Medicina General"),
            record("C", "Especialidades", "Pediatría"),
        ];
        assert_eq!(filter_categories(&records), ["Especialidades", "Básica"]);
    }

    #[test]
    fn test_specialties_by_category_is_exact() {
        let records = vec![
            record("A", "Especialidades", "Cardiología"),
            record("B", "Básica", "Medicina General"),
        ];
        let taxonomy = build_taxonomy(&records);
        assert_eq!(filter_specialties_by_category(&taxonomy, "Especialidades").len(), 1);
        assert!(filter_specialties_by_category(&taxonomy, "especialidades").is_empty());
        assert!(filter_specialties_by_category(&taxonomy, "Especialidades ").is_empty());
        assert!(filter_specialties_by_category(&taxonomy, "Odontología").is_empty());
    }

    #[test]
    fn test_providers_by_specialty_dedup_keeps_first_tier() {
        let mut first = record("Clínica A", "Especialidades", "Cardiología");
        first.complexity = Some("Alta".to_string());
        let mut second = record("Clínica A", "Especialidades", "Cardiología");
        second.complexity = Some("Media".to_string());
        let third = record("Clínica B", "Especialidades", "Cardiología");

        let entries = resolve_providers_by_specialty(&[first, second, third], Some("Cardiología"));
        let names: Vec<_> = entries.iter().map(ProviderEntry::display).collect();
        assert_eq!(names, ["Clínica A (Alta)", "Clínica B"]);
    }

    #[test]
    fn test_unselected_specialty_is_empty() {
        let records = vec![record("A", "Especialidades", "Cardiología")];
        assert!(resolve_providers_by_specialty(&records, None).is_empty());
        assert!(resolve_providers_by_specialty(&records, Some("Pediatría")).is_empty());
    }

    #[test]
    fn test_active_by_contract_flag() {
        let records = vec![
            with_class(Some(1), true),
            with_class(Some(1), true),
            with_class(Some(2), false),
            with_class(Some(3), true),
            with_class(None, true),
        ];
        let active = resolve_active_by_class(&records, ProviderClass::Complementary);
        let ids: Vec<_> = active.iter().map(|r| r.complementary_id).collect();
        assert_eq!(ids, [Some(1), Some(3)]);
        assert!(active.iter().all(|r| r.complementary_active));

        // other classes are untouched by the complementary columns
        assert!(resolve_active_by_class(&records, ProviderClass::Medications).is_empty());
    }

    #[test]
    fn test_generic_contract_flag_accessors() {
        let mut a = record("A", "X", "Y");
        a.is_primary = true;
        let b = record("B", "X", "Y");
        let records = vec![a, b];
        let primary = resolve_active_by_contract_flag(&records, |r| r.is_primary, |r| Some(r.provider_name.clone()));
        assert_eq!(primary.len(), 1);
        assert_eq!(primary[0].provider_name, "A");
    }

    #[test]
    fn test_primary_regions_subregions() {
        let mut a = record("Hospital", "X", "Y");
        a.is_primary = true;
        a.region = "Pacífico".to_string();
        a.subregion = "Litoral".to_string();
        let mut b = a.clone();
        b.specialty = "Z".to_string();
        let mut c = record("Clínica", "X", "Y");
        c.region = "Pacífico".to_string();
        c.subregion = "San Juan".to_string();
        let records = vec![a, b, c];

        assert_eq!(primary_providers(&records), ["Hospital"]);
        assert_eq!(distinct_regions(&records), ["Pacífico"]);
        assert_eq!(distinct_subregions(&records), ["Litoral", "San Juan"]);
    }
}
