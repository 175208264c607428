//! Airtable REST client behind the `RecordStore` port.

use crate::config::{AirtableConfig, API_URL_VAR};
use crate::core::{Fields, Record, RecordStore};
use crate::utils::error::{ExportError, RemoteCause, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

// Wire types, shaped like the Airtable JSON.

#[derive(Debug, Deserialize)]
struct ListPage {
    records: Vec<Record>,
    /// Cursor for the next page; absent on the last one.
    offset: Option<String>,
}

#[derive(Debug, Serialize)]
struct FieldsBody<'a> {
    fields: &'a Fields,
}

#[derive(Debug, Deserialize)]
struct DeletedRecord {
    id: String,
    deleted: bool,
}

#[derive(Clone)]
pub struct AirtableClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl AirtableClient {
    pub fn new(config: &AirtableConfig) -> Result<Self> {
        let mut base_url =
            Url::parse(&config.api_url).map_err(|e| ExportError::InvalidConfigValueError {
                field: API_URL_VAR.to_string(),
                value: config.api_url.clone(),
                reason: e.to_string(),
            })?;

        base_url
            .path_segments_mut()
            .map_err(|_| ExportError::InvalidConfigValueError {
                field: API_URL_VAR.to_string(),
                value: config.api_url.clone(),
                reason: "URL cannot be used as a base".to_string(),
            })?
            .pop_if_empty()
            .push(&config.base_id);

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ExportError::ConfigValidationError {
                field: "http_client".to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// `{api_url}/{base}/{table}[/{record}]`, each segment percent-encoded.
    fn table_url(&self, table: &str, record_id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(table);
            if let Some(id) = record_id {
                segments.push(id);
            }
        }
        url
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        table: &str,
        request: RequestBuilder,
    ) -> Result<T> {
        let response = request
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ExportError::remote(operation, table, e))?;

        let status = response.status();
        tracing::debug!("Airtable {} {} -> {}", operation, table, status);

        let body = response
            .text()
            .await
            .map_err(|e| ExportError::remote(operation, table, e))?;

        if !status.is_success() {
            return Err(ExportError::remote(
                operation,
                table,
                RemoteCause::Status {
                    status: status.as_u16(),
                    message: api_error_message(&body)
                        .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string()),
                },
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            ExportError::remote(operation, table, RemoteCause::MalformedResponse(e.to_string()))
        })
    }
}

/// Pulls `error.type`/`error.message` (or a bare `error` string) out of an Airtable error body.
fn api_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("error")? {
        serde_json::Value::String(code) => Some(code.clone()),
        serde_json::Value::Object(detail) => {
            let kind = detail.get("type").and_then(|v| v.as_str());
            let message = detail.get("message").and_then(|v| v.as_str());
            match (kind, message) {
                (Some(kind), Some(message)) => Some(format!("{}: {}", kind, message)),
                (Some(text), None) | (None, Some(text)) => Some(text.to_string()),
                (None, None) => None,
            }
        }
        _ => None,
    }
}

#[async_trait]
impl RecordStore for AirtableClient {
    async fn list_all(&self, table: &str) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut request = self.client.get(self.table_url(table, None));
            if let Some(cursor) = &offset {
                request = request.query(&[("offset", cursor)]);
            }

            let page: ListPage = self.send("list", table, request).await?;
            tracing::debug!("📄 {}: page with {} records", table, page.records.len());
            records.extend(page.records);

            match page.offset {
                Some(next) if offset.as_deref() == Some(next.as_str()) => {
                    return Err(ExportError::remote(
                        "list",
                        table,
                        RemoteCause::MalformedResponse(format!("offset {} did not advance", next)),
                    ));
                }
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(records)
    }

    async fn create(&self, table: &str, fields: Fields) -> Result<Record> {
        let request = self
            .client
            .post(self.table_url(table, None))
            .json(&FieldsBody { fields: &fields });
        let record: Record = self.send("create", table, request).await?;
        tracing::info!("Created record {} in {}", record.id, table);
        Ok(record)
    }

    async fn update(&self, table: &str, id: &str, fields: Fields) -> Result<Record> {
        let request = self
            .client
            .patch(self.table_url(table, Some(id)))
            .json(&FieldsBody { fields: &fields });
        let record: Record = self.send("update", table, request).await?;
        tracing::info!("Updated record {} in {}", record.id, table);
        Ok(record)
    }

    async fn delete(&self, table: &str, id: &str) -> Result<()> {
        let request = self.client.delete(self.table_url(table, Some(id)));
        let deleted: DeletedRecord = self.send("delete", table, request).await?;

        if !deleted.deleted || deleted.id != id {
            return Err(ExportError::remote(
                "delete",
                table,
                RemoteCause::MalformedResponse(format!(
                    "expected deletion of {}, got {} (deleted: {})",
                    id, deleted.id, deleted.deleted
                )),
            ));
        }

        tracing::info!("Deleted record {} from {}", id, table);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_url: &str) -> AirtableClient {
        AirtableClient::new(&AirtableConfig::new("pat", "appBase").with_api_url(api_url)).unwrap()
    }

    #[test]
    fn test_table_url_encodes_segments() {
        let client = client("https://api.airtable.com/v0");
        assert_eq!(
            client.table_url("Tasks", None).as_str(),
            "https://api.airtable.com/v0/appBase/Tasks"
        );
        assert_eq!(
            client.table_url("People & Roles/2024", Some("rec1")).as_str(),
            "https://api.airtable.com/v0/appBase/People%20&%20Roles%2F2024/rec1"
        );
    }

    #[test]
    fn test_trailing_slash_in_api_url() {
        let client = client("http://localhost:8080/v0/");
        assert_eq!(
            client.table_url("Tasks", None).as_str(),
            "http://localhost:8080/v0/appBase/Tasks"
        );
    }

    #[test]
    fn test_api_error_message_shapes() {
        assert_eq!(
            api_error_message(r#"{"error":{"type":"INVALID_PERMISSIONS","message":"No access"}}"#)
                .as_deref(),
            Some("INVALID_PERMISSIONS: No access")
        );
        assert_eq!(
            api_error_message(r#"{"error":"NOT_FOUND"}"#).as_deref(),
            Some("NOT_FOUND")
        );
        assert_eq!(api_error_message("<html>bad gateway</html>"), None);
    }
}
