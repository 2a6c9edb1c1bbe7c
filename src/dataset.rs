/*!
 * Record store for one location query
 *
 * A [`RecordStore`] holds the rows returned by a single fetch. It is never
 * patched in place: a new fetch produces a new store.
 */

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::data_types::*;
use crate::taxonomy::{self, ProviderEntry, TaxonomyNode};

/// The flat result set of one location query
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecordStore {
    /// Query the records were fetched for (None for an empty, cleared store)
    pub query: Option<LocationQuery>,

    /// Provider rows, in the order the service returned them
    pub records: Vec<ProviderRecord>,

    /// When the rows were received
    pub fetched_at: Option<DateTime<Utc>>,
}

impl RecordStore {
    /// Create a store from freshly fetched records
    pub fn new(query: LocationQuery, records: Vec<ProviderRecord>) -> Self {
        Self {
            query: Some(query),
            records,
            fetched_at: Some(Utc::now()),
        }
    }

    /// Create a store with no query attached
    pub fn from_records(records: Vec<ProviderRecord>) -> Self {
        Self {
            query: None,
            records,
            fetched_at: None,
        }
    }

    /// The cleared store
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Coordinates of the queried location (taken from the first row)
    pub fn location(&self) -> Option<Coordinates> {
        self.records.first().map(ProviderRecord::coordinates)
    }

    pub fn taxonomy(&self) -> Vec<TaxonomyNode> {
        taxonomy::build_taxonomy(&self.records)
    }

    pub fn categories(&self) -> Vec<String> {
        taxonomy::filter_categories(&self.records)
    }

    pub fn providers_for_specialty(&self, specialty: Option<&str>) -> Vec<ProviderEntry> {
        taxonomy::resolve_providers_by_specialty(&self.records, specialty)
    }

    pub fn active_for_class(&self, class: ProviderClass) -> Vec<&ProviderRecord> {
        taxonomy::resolve_active_by_class(&self.records, class)
    }

    /// Find the active row for a class by its identifier
    pub fn find_active(&self, class: ProviderClass, id: i64) -> Option<&ProviderRecord> {
        self.active_for_class(class)
            .into_iter()
            .find(|r| r.secondary(class).id == Some(id))
    }

    /// Create a query builder for this store
    pub fn query(&self) -> RecordQuery<'_> {
        RecordQuery::new(self)
    }

    /// Get store statistics
    pub fn statistics(&self) -> StoreStatistics {
        StoreStatistics::from_store(self)
    }
}

/// Query builder over a record store
pub struct RecordQuery<'a> {
    store: &'a RecordStore,
    filters: Vec<Box<dyn Fn(&ProviderRecord) -> bool + 'a>>,
}

impl<'a> RecordQuery<'a> {
    pub fn new(store: &'a RecordStore) -> Self {
        Self {
            store,
            filters: Vec::new(),
        }
    }

    /// Filter by category (exact match)
    pub fn category(mut self, category: &'a str) -> Self {
        self.filters.push(Box::new(move |r| r.category == category));
        self
    }

    /// Filter by specialty (exact match)
    pub fn specialty(mut self, specialty: &'a str) -> Self {
        self.filters.push(Box::new(move |r| r.specialty == specialty));
        self
    }

    /// Filter by provider name (case-insensitive substring)
    pub fn provider_name_contains(mut self, needle: &str) -> Self {
        let needle = needle.to_lowercase();
        self.filters.push(Box::new(move |r| r.provider_name.to_lowercase().contains(&needle)));
        self
    }

    /// Only rows flagged as primary provider
    pub fn primary_only(mut self) -> Self {
        self.filters.push(Box::new(|r| r.is_primary));
        self
    }

    /// Only rows with an active contract for the given class
    pub fn active_contract(mut self, class: ProviderClass) -> Self {
        self.filters.push(Box::new(move |r| r.secondary(class).active_contract));
        self
    }

    /// Execute the query and return matching rows
    pub fn execute(self) -> Vec<&'a ProviderRecord> {
        self.store
            .records
            .iter()
            .filter(|record| self.filters.iter().all(|filter| filter(record)))
            .collect()
    }

    pub fn count(self) -> usize {
        self.execute().len()
    }

    /// Execute the query with a limit
    pub fn limit(self, limit: usize) -> Vec<&'a ProviderRecord> {
        self.store
            .records
            .iter()
            .filter(|record| self.filters.iter().all(|filter| filter(record)))
            .take(limit)
            .collect()
    }
}

/// Store statistics
#[derive(Debug, Clone, Serialize)]
pub struct StoreStatistics {
    pub total_records: usize,
    pub distinct_providers: usize,
    pub primary_providers: usize,
    pub categories: usize,
    pub specialties: usize,
    pub records_with_complexity: usize,
    /// Distinct active providers per secondary class
    pub active_by_class: Vec<(ProviderClass, usize)>,
    pub regions: Vec<String>,
    pub subregions: Vec<String>,
}

impl StoreStatistics {
    pub fn from_store(store: &RecordStore) -> Self {
        let records = &store.records;
        let distinct_providers = records
            .iter()
            .map(|r| r.provider_name.as_str())
            .collect::<HashSet<_>>()
            .len();

        Self {
            total_records: records.len(),
            distinct_providers,
            primary_providers: taxonomy::primary_providers(records).len(),
            categories: taxonomy::filter_categories(records).len(),
            specialties: taxonomy::build_taxonomy(records).len(),
            records_with_complexity: records.iter().filter(|r| r.complexity_tier().is_some()).count(),
            active_by_class: ProviderClass::ALL
                .iter()
                .map(|&class| (class, taxonomy::resolve_active_by_class(records, class).len()))
                .collect(),
            regions: taxonomy::distinct_regions(records),
            subregions: taxonomy::distinct_subregions(records),
        }
    }

    /// Print a formatted summary of the statistics
    pub fn print_summary(&self) {
        println!("=== Provider Store Statistics ===");
        println!("Total Records: {}", self.total_records);
        println!("Distinct Providers: {}", self.distinct_providers);
        println!("  Primary: {}", self.primary_providers);
        println!("Categories: {}", self.categories);
        println!("Specialties: {}", self.specialties);
        if self.total_records > 0 {
            println!(
                "Records with Complexity Tier: {} ({:.1}%)",
                self.records_with_complexity,
                (self.records_with_complexity as f64 / self.total_records as f64) * 100.0
            );
        }
        for (class, count) in &self.active_by_class {
            if *count > 0 {
                println!("Active {}: {}", class, count);
            }
        }
        if !self.regions.is_empty() {
            println!("Region: {}", self.regions.join(", "));
        }
        if !self.subregions.is_empty() {
            println!("Subregion: {}", self.subregions.join(", "));
        }
    }
}
