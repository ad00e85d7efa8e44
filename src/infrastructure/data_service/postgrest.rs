//! PostgREST data service client
//!
//! Talks to the REST layer of a hosted Postgres:
//! - `POST /rest/v1/rpc/{procedure}` for remote procedures
//! - `GET /rest/v1/{table}` for table reads
//! - `PATCH /rest/v1/{table}` for row updates

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

use super::HttpClientTrait;
use crate::domain::data_service::{ColumnFilter, DataServiceClient, ProcedureCall, TableSelect};
use crate::domain::DomainError;

const REST_PATH: &str = "rest/v1";

/// Data service client for a PostgREST endpoint
#[derive(Debug)]
pub struct PostgrestClient<C: HttpClientTrait> {
    client: C,
    base_url: String,
    api_key: String,
    auth_header: String,
}

impl<C: HttpClientTrait> PostgrestClient<C> {
    pub fn new(client: C, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        let auth_header = format!("Bearer {}", api_key);
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            base_url,
            api_key,
            auth_header,
        }
    }

    fn rpc_url(&self, procedure: &str) -> String {
        format!("{}/{}/rpc/{}", self.base_url, REST_PATH, procedure)
    }

    fn table_url(&self, table: &str) -> Result<Url, DomainError> {
        let raw = format!("{}/{}/{}", self.base_url, REST_PATH, table);
        Url::parse(&raw)
            .map_err(|e| DomainError::configuration(format!("Invalid data service URL: {}", e)))
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("apikey", self.api_key.as_str()),
            ("Authorization", self.auth_header.as_str()),
            ("Accept", "application/json"),
            ("Content-Type", "application/json"),
        ]
    }

    fn select_url(&self, select: &TableSelect) -> Result<Url, DomainError> {
        let mut url = self.table_url(&select.table)?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", &select.columns);

            for filter in &select.filters {
                pairs.append_pair(&filter.column, &filter.encoded_value());
            }

            if let Some(order) = &select.order {
                pairs.append_pair("order", &order.encoded());
            }

            if let Some(limit) = select.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
        }

        Ok(url)
    }

    fn filtered_url(&self, table: &str, filters: &[ColumnFilter]) -> Result<Url, DomainError> {
        let mut url = self.table_url(table)?;

        {
            let mut pairs = url.query_pairs_mut();

            for filter in filters {
                pairs.append_pair(&filter.column, &filter.encoded_value());
            }
        }

        Ok(url)
    }
}

/// Normalise a response body into rows
///
/// Set-returning functions answer with an array, scalar functions with a
/// single value, and void functions with nothing.
pub fn rows_from_value(value: Value) -> Vec<Value> {
    match value {
        Value::Array(rows) => rows,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

fn retarget(target: &str, error: DomainError) -> DomainError {
    match error {
        DomainError::Remote { message, .. } => DomainError::remote(target, message),
        other => other,
    }
}

#[async_trait]
impl<C: HttpClientTrait> DataServiceClient for PostgrestClient<C> {
    async fn call_procedure(&self, call: &ProcedureCall) -> Result<Vec<Value>, DomainError> {
        let url = self.rpc_url(call.name());
        let body = Value::Object(call.args().clone());

        debug!(procedure = %call.name(), "Calling remote procedure");

        let response = self
            .client
            .post_json(&url, self.headers(), &body)
            .await
            .map_err(|e| retarget(call.name(), e))?;

        Ok(rows_from_value(response))
    }

    async fn select(&self, select: &TableSelect) -> Result<Vec<Value>, DomainError> {
        let url = self.select_url(select)?;

        debug!(table = %select.table, filters = select.filters.len(), "Selecting rows");

        let response = self
            .client
            .get_json(url.as_str(), self.headers())
            .await
            .map_err(|e| retarget(&select.table, e))?;

        Ok(rows_from_value(response))
    }

    async fn update(
        &self,
        table: &str,
        filters: &[ColumnFilter],
        patch: &Value,
    ) -> Result<Vec<Value>, DomainError> {
        if filters.is_empty() {
            return Err(DomainError::validation(format!(
                "Refusing to update every row of '{}'",
                table
            )));
        }

        let url = self.filtered_url(table, filters)?;
        let mut headers = self.headers();
        headers.push(("Prefer", "return=representation"));

        debug!(table = %table, "Updating rows");

        let response = self
            .client
            .patch_json(url.as_str(), headers, patch)
            .await
            .map_err(|e| retarget(table, e))?;

        Ok(rows_from_value(response))
    }
}
