// Bundled Assets - embedded fallback datasets and variant tables
//
// Everything here ships inside the binary (include_str!), so the terminal
// sourcing step and the variant tables are available without any I/O.

use mirage_core::domain::{
    ClassKey, Entity, EntityFamily, IdKey, TextKey, VariantKey, VariantTable,
};
use mirage_core::port::FallbackCatalog;
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

const JOBS_JSON: &str = include_str!("../data/jobs.json");
const DOCTORS_JSON: &str = include_str!("../data/doctors.json");
const PRODUCTS_JSON: &str = include_str!("../data/products.json");
const TRIPS_JSON: &str = include_str!("../data/trips.json");

const VARIANT_IDS_JSON: &str = include_str!("../data/variants_ids.json");
const VARIANT_CLASSES_JSON: &str = include_str!("../data/variants_classes.json");
const VARIANT_TEXTS_JSON: &str = include_str!("../data/variants_texts.json");

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Malformed bundled dataset for {family}: {message}")]
    Dataset { family: EntityFamily, message: String },

    #[error("Malformed variant table {file}: {message}")]
    VariantTable { file: &'static str, message: String },
}

/// Catalog backed by the embedded JSON datasets.
///
/// Parsed once at construction; `dataset` clones from memory and cannot
/// fail afterwards.
pub struct BundledCatalog {
    datasets: HashMap<EntityFamily, Vec<Entity>>,
}

impl BundledCatalog {
    pub fn load() -> Result<Self, BundleError> {
        let mut datasets = HashMap::new();
        for (family, raw) in [
            (EntityFamily::Jobs, JOBS_JSON),
            (EntityFamily::Doctors, DOCTORS_JSON),
            (EntityFamily::Products, PRODUCTS_JSON),
            (EntityFamily::Trips, TRIPS_JSON),
        ] {
            datasets.insert(family, parse_dataset(family, raw)?);
        }
        Ok(Self { datasets })
    }
}

impl FallbackCatalog for BundledCatalog {
    fn dataset(&self, family: EntityFamily) -> Vec<Entity> {
        self.datasets.get(&family).cloned().unwrap_or_default()
    }
}

fn parse_dataset(family: EntityFamily, raw: &str) -> Result<Vec<Entity>, BundleError> {
    let records: Vec<serde_json::Value> =
        serde_json::from_str(raw).map_err(|e| BundleError::Dataset {
            family,
            message: e.to_string(),
        })?;

    let mut entities = Vec::with_capacity(records.len());
    for record in records {
        match Entity::from_value(family, record) {
            Some(entity) => entities.push(entity),
            None => {
                return Err(BundleError::Dataset {
                    family,
                    message: "record without usable id".to_string(),
                })
            }
        }
    }
    Ok(entities)
}

/// The three facet tables loaded from the embedded variant data.
pub struct VariantTables {
    pub ids: VariantTable<IdKey>,
    pub classes: VariantTable<ClassKey>,
    pub texts: VariantTable<TextKey>,
}

pub fn load_variant_tables() -> Result<VariantTables, BundleError> {
    Ok(VariantTables {
        ids: parse_table("variants_ids.json", VARIANT_IDS_JSON)?,
        classes: parse_table("variants_classes.json", VARIANT_CLASSES_JSON)?,
        texts: parse_table("variants_texts.json", VARIANT_TEXTS_JSON)?,
    })
}

fn parse_table<K: VariantKey>(
    file: &'static str,
    raw: &str,
) -> Result<VariantTable<K>, BundleError> {
    let entries: HashMap<String, Vec<String>> =
        serde_json::from_str(raw).map_err(|e| BundleError::VariantTable {
            file,
            message: e.to_string(),
        })?;

    let (table, unknown) = VariantTable::from_entries(entries);
    for token in unknown {
        warn!(file, token = %token, "Skipping unknown variant token");
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads_all_families() {
        let catalog = BundledCatalog::load().unwrap();
        for family in EntityFamily::ALL {
            let entities = catalog.dataset(family);
            assert!(!entities.is_empty(), "{} dataset empty", family);
            for entity in &entities {
                assert!(entity.id.starts_with(family.id_prefix()));
            }
        }
    }

    #[test]
    fn test_datasets_have_display_fields() {
        let catalog = BundledCatalog::load().unwrap();
        assert!(catalog.dataset(EntityFamily::Jobs)
            .iter()
            .all(|e| e.data.str_field("title").is_some()));
        assert!(catalog.dataset(EntityFamily::Doctors)
            .iter()
            .all(|e| e.data.str_field("name").is_some()));
        assert!(catalog.dataset(EntityFamily::Products)
            .iter()
            .all(|e| e.data.num_field("price").is_some()));
        assert!(catalog.dataset(EntityFamily::Trips)
            .iter()
            .all(|e| e.data.str_field("destination").is_some()));
    }

    #[test]
    fn test_variant_tables_cover_every_key() {
        let tables = load_variant_tables().unwrap();
        for key in IdKey::ALL {
            assert!(tables.ids.candidates(*key).is_some(), "missing id entry {}", key.token());
        }
        for key in ClassKey::ALL {
            assert!(tables.classes.candidates(*key).is_some(), "missing class entry {}", key.token());
        }
        for key in TextKey::ALL {
            assert!(tables.texts.candidates(*key).is_some(), "missing text entry {}", key.token());
        }
    }

    #[test]
    fn test_variant_candidates_nonempty() {
        let tables = load_variant_tables().unwrap();
        for key in ClassKey::ALL {
            assert!(!tables.classes.candidates(*key).unwrap().is_empty());
        }
    }
}
