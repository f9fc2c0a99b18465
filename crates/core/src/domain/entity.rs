// Entity Domain Model

use serde::{Deserialize, Serialize};

/// Entity families served by the demo applications.
///
/// One provider instance exists per family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityFamily {
    Jobs,
    Doctors,
    Products,
    Trips,
}

impl EntityFamily {
    pub const ALL: [EntityFamily; 4] = [
        EntityFamily::Jobs,
        EntityFamily::Doctors,
        EntityFamily::Products,
        EntityFamily::Trips,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityFamily::Jobs => "jobs",
            EntityFamily::Doctors => "doctors",
            EntityFamily::Products => "products",
            EntityFamily::Trips => "trips",
        }
    }

    /// Id prefix used by the bundled datasets.
    ///
    /// Remote sourcing paths are free to format ids differently, which is
    /// why lookup runs a fallback ladder instead of exact match only.
    pub fn id_prefix(self) -> &'static str {
        match self {
            EntityFamily::Jobs => "JB-",
            EntityFamily::Doctors => "CL-",
            EntityFamily::Products => "SKU-",
            EntityFamily::Trips => "TR-",
        }
    }

    pub fn index(self) -> usize {
        match self {
            EntityFamily::Jobs => 0,
            EntityFamily::Doctors => 1,
            EntityFamily::Products => 2,
            EntityFamily::Trips => 3,
        }
    }
}

impl std::fmt::Display for EntityFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Family-specific fields (JSON serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityData(serde_json::Value);

impl EntityData {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|v| v.as_str())
    }

    pub fn num_field(&self, name: &str) -> Option<f64> {
        self.0.get(name).and_then(|v| v.as_f64())
    }

    pub fn date_field(&self, name: &str) -> Option<chrono::NaiveDate> {
        self.str_field(name)
            .and_then(|s| chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
    }
}

/// Domain record served to the UI layer.
///
/// The id format is NOT consistent across sourcing paths: bundled data
/// carries family prefixes, DB-seeded rows may use bare numerics, and
/// generated records get synthetic ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub family: EntityFamily,
    pub data: EntityData,
}

impl Entity {
    pub fn new(family: EntityFamily, id: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            family,
            data: EntityData::new(data),
        }
    }

    /// Build an entity from a raw JSON record, taking the id from its
    /// `id` field. Returns None when no usable id is present.
    pub fn from_value(family: EntityFamily, value: serde_json::Value) -> Option<Self> {
        let id = match value.get("id") {
            Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => return None,
        };
        Some(Self {
            id,
            family,
            data: EntityData::new(value),
        })
    }
}
