// HTTP Generator Adapter
//
// POST {base_url}/generate describing the wanted record shape; the
// service returns a freshly generated dataset. Records arriving without
// an id get a synthetic one so downstream lookup still works.

use crate::config::HttpConfig;
use async_trait::async_trait;
use mirage_core::domain::{Entity, EntityFamily};
use mirage_core::port::{Generator, SourcingError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    interface_definition: serde_json::Value,
    examples: Vec<serde_json::Value>,
    count: usize,
    categories: Vec<&'a str>,
    naming_rules: serde_json::Value,
}

#[derive(Deserialize)]
struct GenerateResponse {
    generated_data: Vec<serde_json::Value>,
}

pub struct HttpGenerator {
    client: reqwest::Client,
    config: HttpConfig,
}

impl HttpGenerator {
    pub fn new(config: HttpConfig) -> Result<Self, SourcingError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SourcingError::Http(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/generate", self.config.base_url.trim_end_matches('/'))
    }

    fn interface_definition(family: EntityFamily) -> serde_json::Value {
        match family {
            EntityFamily::Jobs => json!({
                "id": "string", "title": "string", "company": "string",
                "location": "string", "salary": "string", "posted_at": "date"
            }),
            EntityFamily::Doctors => json!({
                "id": "string", "name": "string", "specialty": "string",
                "clinic": "string", "city": "string", "rating": "number"
            }),
            EntityFamily::Products => json!({
                "id": "string", "name": "string", "brand": "string",
                "price": "number", "category": "string", "rating": "number"
            }),
            EntityFamily::Trips => json!({
                "id": "string", "destination": "string", "country": "string",
                "nights": "number", "price": "number", "departure": "date"
            }),
        }
    }

    fn categories(family: EntityFamily) -> Vec<&'static str> {
        match family {
            EntityFamily::Jobs => vec!["engineering", "design", "operations"],
            EntityFamily::Doctors => vec!["clinic", "hospital", "practice"],
            EntityFamily::Products => vec!["home", "electronics", "outdoor"],
            EntityFamily::Trips => vec!["city", "nature", "coast"],
        }
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    async fn generate(
        &self,
        family: EntityFamily,
        count: usize,
    ) -> Result<Vec<Entity>, SourcingError> {
        let request = GenerateRequest {
            interface_definition: Self::interface_definition(family),
            examples: Vec::new(),
            count,
            categories: Self::categories(family),
            naming_rules: json!({ "id_style": "prefixed", "locale": "en" }),
        };

        debug!(family = %family, count, "Requesting generated dataset");

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

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| SourcingError::Parse(e.to_string()))?;

        let entities: Vec<Entity> = body
            .generated_data
            .into_iter()
            .map(|record| {
                Entity::from_value(family, record.clone()).unwrap_or_else(|| {
                    Entity::new(family, uuid::Uuid::new_v4().to_string(), record)
                })
            })
            .collect();

        if entities.is_empty() {
            return Err(SourcingError::Empty);
        }
        Ok(entities)
    }
}
