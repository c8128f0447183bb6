//! Nutrition catalog
//!
//! The food table, loaded once and shared read-only by the aggregation
//! engine and the plan generator.

pub mod data_loader;
pub mod food_record;

use std::collections::HashMap;
use std::path::Path;

pub use data_loader::{load_catalog, read_catalog};
pub use food_record::FoodRecord;

use crate::error::{CatalogLoadError, NotFound};

/// Ordered food records with a normalized-name index
#[derive(Debug, Clone)]
pub struct Catalog {
    records: Vec<FoodRecord>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Load a catalog from a CSV file
    pub fn load(path: &Path) -> Result<Self, CatalogLoadError> {
        load_catalog(path)
    }

    /// Build a catalog from in-memory records.
    ///
    /// Rejects empty names, negative or non-finite nutrients, and names that
    /// collide after normalization.
    pub fn from_records(records: Vec<FoodRecord>) -> Result<Self, CatalogLoadError> {
        if records.is_empty() {
            return Err(CatalogLoadError::Empty);
        }

        let mut index = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            let row = position + 1;
            let key = normalize_name(&record.name);
            if key.is_empty() {
                return Err(CatalogLoadError::EmptyName);
            }
            for (nutrient, value) in record.nutrients.iter() {
                if !value.is_finite() {
                    return Err(CatalogLoadError::InvalidNumber {
                        row,
                        column: nutrient.to_string(),
                        value: value.to_string(),
                    });
                }
                if value < 0.0 {
                    return Err(CatalogLoadError::NegativeNutrient {
                        row,
                        column: nutrient.to_string(),
                        value,
                    });
                }
            }
            if index.insert(key, position).is_some() {
                return Err(CatalogLoadError::DuplicateName {
                    row,
                    name: record.name.clone(),
                });
            }
        }

        Ok(Self { records, index })
    }

    /// Exact, case- and whitespace-insensitive lookup
    pub fn lookup(&self, name: &str) -> Result<&FoodRecord, NotFound> {
        self.get(name).ok_or_else(|| NotFound {
            name: name.trim().to_string(),
        })
    }

    pub fn get(&self, name: &str) -> Option<&FoodRecord> {
        self.index
            .get(&normalize_name(name))
            .map(|&position| &self.records[position])
    }

    pub fn records(&self) -> &[FoodRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &FoodRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Lookup key: lowercased with whitespace runs collapsed
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Tag key: lowercased with every run of non-alphanumerics turned into `_`
pub fn normalize_tag(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len());
    let mut pending_separator = false;
    for c in tag.trim().chars() {
        if c.is_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('_');
            }
            pending_separator = false;
            out.extend(c.to_lowercase());
        } else {
            pending_separator = true;
        }
    }
    out
}

/// Allergen key: a tag reduced to its singular form ("peanuts" -> "peanut")
pub fn normalize_allergen(allergen: &str) -> String {
    let tag = normalize_tag(allergen);
    if let Some(stem) = tag.strip_suffix("ies") {
        if stem.len() >= 2 {
            return format!("{}y", stem);
        }
    }
    if tag.len() > 3 && tag.ends_with('s') && !tag.ends_with("ss") {
        return tag[..tag.len() - 1].to_string();
    }
    tag
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrients::Nutrients;

    fn fixture() -> Catalog {
        Catalog::from_records(vec![
            FoodRecord::new("Rice, cooked", Nutrients::macros(130.0, 2.7, 28.0, 0.3)),
            FoodRecord::new("Sambar", Nutrients::macros(65.0, 3.0, 9.0, 2.0)),
        ])
        .unwrap()
    }

    #[test]
    fn test_lookup_ignores_case_and_whitespace() {
        let catalog = fixture();
        assert_eq!(catalog.lookup("  rice,   COOKED ").unwrap().name, "Rice, cooked");
        assert!(catalog.get("SAMBAR").is_some());
    }

    #[test]
    fn test_lookup_is_exact_match_only() {
        let catalog = fixture();
        let err = catalog.lookup("rice").unwrap_err();
        assert_eq!(err.name, "rice");
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = Catalog::from_records(vec![
            FoodRecord::new("Idli", Nutrients::macros(146.0, 4.5, 30.0, 0.4)),
            FoodRecord::new("IDLI ", Nutrients::macros(146.0, 4.5, 30.0, 0.4)),
        ]);
        assert!(matches!(result, Err(CatalogLoadError::DuplicateName { row: 2, .. })));
    }

    #[test]
    fn test_negative_nutrient_rejected() {
        let result = Catalog::from_records(vec![FoodRecord::new(
            "Broken",
            Nutrients::macros(-1.0, 0.0, 0.0, 0.0),
        )]);
        assert!(matches!(result, Err(CatalogLoadError::NegativeNutrient { .. })));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(matches!(Catalog::from_records(vec![]), Err(CatalogLoadError::Empty)));
    }

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("South India"), "south_india");
        assert_eq!(normalize_tag(" Non-Vegetarian "), "non_vegetarian");
        assert_eq!(normalize_tag("high  sugar"), "high_sugar");
    }

    #[test]
    fn test_normalize_allergen() {
        assert_eq!(normalize_allergen("Peanuts"), "peanut");
        assert_eq!(normalize_allergen("tree nuts"), "tree_nut");
        assert_eq!(normalize_allergen("berries"), "berry");
        assert_eq!(normalize_allergen("fish"), "fish");
        assert_eq!(normalize_allergen("soy"), "soy");
    }
}
