use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{CandidateSource, ExternalServiceError};
use crate::config::CollaboratorConfig;
use crate::engine::domain::Product;

const SERVICE: &str = "catalog";

/// HTTP client for the product catalog search endpoint. The endpoint takes a
/// plain keyword and returns an unranked JSON array; result order doubles as
/// a popularity signal.
pub struct CatalogHttpClient {
    http: reqwest::Client,
    base_url: String,
}

impl CatalogHttpClient {
    pub fn new(config: &CollaboratorConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.catalog_base_url.clone(),
        }
    }
}

#[async_trait]
impl CandidateSource for CatalogHttpClient {
    async fn search(&self, keyword: &str) -> Result<Vec<Product>, ExternalServiceError> {
        let response = self
            .http
            .post(&self.base_url)
            .json(&serde_json::json!({ "keyword": keyword }))
            .send()
            .await
            .map_err(|err| ExternalServiceError::Request {
                service: SERVICE,
                reason: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExternalServiceError::Request {
                service: SERVICE,
                reason: format!("status {status}"),
            });
        }

        let items: Vec<Value> =
            response
                .json()
                .await
                .map_err(|err| ExternalServiceError::Payload {
                    service: SERVICE,
                    reason: err.to_string(),
                })?;

        let products = parse_items(items);
        debug!(keyword, count = products.len(), "catalog search complete");
        Ok(products)
    }
}

/// Raw catalog item. The upstream schema is loose, so every field is
/// optional and unparseable entries are skipped rather than failing the
/// whole search.
#[derive(Debug, Deserialize)]
struct CatalogItem {
    id: Option<Value>,
    name: Option<String>,
    alt: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(rename = "metaTagDescription")]
    meta_tag_description: Option<String>,
    #[serde(rename = "minPrice")]
    min_price: Option<f64>,
    #[serde(rename = "maxPrice")]
    max_price: Option<f64>,
    image: Option<String>,
    #[serde(rename = "ingrediantNames", default)]
    ingredient_names: Vec<String>,
}

fn parse_items(items: Vec<Value>) -> Vec<Product> {
    let mut products = Vec::with_capacity(items.len());

    for (index, raw) in items.into_iter().enumerate() {
        let rank = index as u32 + 1;
        match parse_item(raw, rank) {
            Some(product) => products.push(product),
            None => warn!(rank, "skipping unparseable catalog item"),
        }
    }

    products
}

fn parse_item(raw: Value, rank: u32) -> Option<Product> {
    let item: CatalogItem = serde_json::from_value(raw).ok()?;

    let id = match item.id? {
        Value::String(s) if !s.is_empty() => s,
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    // The listing image carries the display name in its alt text more
    // reliably than the name field does.
    let name = item
        .alt
        .filter(|alt| !alt.trim().is_empty())
        .or(item.name)
        .unwrap_or_else(|| "Unknown Product".to_string());

    let price = item.max_price.or(item.min_price)?;
    if !price.is_finite() || price < 0.0 {
        return None;
    }

    let mut description = item.description;
    if let Some(meta) = item.meta_tag_description {
        if !meta.trim().is_empty() {
            if !description.is_empty() {
                description.push(' ');
            }
            description.push_str(meta.trim());
        }
    }

    Some(Product {
        id,
        name,
        description,
        price,
        image_url: item.image,
        attributes: item.ingredient_names,
        popularity_rank: Some(rank),
    })
}
