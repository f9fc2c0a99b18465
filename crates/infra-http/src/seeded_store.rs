// HTTP Seeded Store Adapter
//
// POST {base_url}/selection with the project key and seed value; the
// store returns a deterministic subset for that seed.

use crate::config::HttpConfig;
use async_trait::async_trait;
use mirage_core::domain::{Entity, EntityFamily};
use mirage_core::port::{SeededStore, SourcingError};
use serde::{Deserialize, Serialize};
use tracing::debug;

const SELECTION_METHOD: &str = "modulo";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SelectionRequest<'a> {
    project_key: &'a str,
    entity_type: &'a str,
    seed_value: u64,
    limit: usize,
    method: &'a str,
}

#[derive(Deserialize)]
struct SelectionResponse {
    items: Vec<serde_json::Value>,
}

pub struct HttpSeededStore {
    client: reqwest::Client,
    config: HttpConfig,
}

impl HttpSeededStore {
    pub fn new(config: HttpConfig) -> Result<Self, SourcingError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SourcingError::Http(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/selection", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SeededStore for HttpSeededStore {
    async fn fetch_selection(
        &self,
        family: EntityFamily,
        seed_value: u64,
        limit: usize,
    ) -> Result<Vec<Entity>, SourcingError> {
        let request = SelectionRequest {
            project_key: &self.config.project_key,
            entity_type: family.as_str(),
            seed_value,
            limit,
            method: SELECTION_METHOD,
        };

        debug!(family = %family, seed_value, limit, "Requesting seeded selection");

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SourcingError::Timeout(self.config.timeout.as_millis() as u64)
                } else {
                    SourcingError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourcingError::Http(format!("status {}", status)));
        }

        let body: SelectionResponse = response
            .json()
            .await
            .map_err(|e| SourcingError::Parse(e.to_string()))?;

        let entities: Vec<Entity> = body
            .items
            .into_iter()
            .filter_map(|record| Entity::from_value(family, record))
            .collect();

        if entities.is_empty() {
            return Err(SourcingError::Empty);
        }
        Ok(entities)
    }
}
