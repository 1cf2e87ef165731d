//! DynamoDB-backed state store
//!
//! Items look like `{"DeploymentId": {"S": "<id>"}, "CreatedAt": {"S": "<rfc3339>"}}`.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::ProvideErrorMetadata;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use crate::errors::ListenerError;
use crate::models::deployment::parse_timestamp;
use crate::state::StateStore;

pub const DEFAULT_TABLE: &str = "deploy_listener";

const KEY_ATTRIBUTE: &str = "DeploymentId";
const CREATED_AT_ATTRIBUTE: &str = "CreatedAt";

type Item = HashMap<String, AttributeValue>;

/// Tracked state kept in a DynamoDB table keyed by `DeploymentId`
pub struct DynamoDbStateStore {
    client: Client,
    table: String,
}

impl DynamoDbStateStore {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

fn key(deployment_id: &str) -> Item {
    HashMap::from([(
        KEY_ATTRIBUTE.to_string(),
        AttributeValue::S(deployment_id.to_string()),
    )])
}

fn item(deployment_id: &str, created_at: DateTime<Utc>) -> Item {
    let mut item = key(deployment_id);
    item.insert(
        CREATED_AT_ATTRIBUTE.to_string(),
        AttributeValue::S(created_at.to_rfc3339_opts(SecondsFormat::Secs, false)),
    );
    item
}

fn created_at_from_item(deployment_id: &str, item: &Item) -> Result<DateTime<Utc>, ListenerError> {
    item.get(CREATED_AT_ATTRIBUTE)
        .and_then(|value| value.as_s().ok())
        .and_then(|raw| parse_timestamp(raw))
        .ok_or_else(|| {
            ListenerError::StateStore(format!(
                "item {} has no valid {} attribute",
                deployment_id, CREATED_AT_ATTRIBUTE
            ))
        })
}

fn store_error<E: ProvideErrorMetadata + std::fmt::Display>(action: &str, err: E) -> ListenerError {
    ListenerError::StateStore(format!(
        "{} failed ({}): {}",
        action,
        err.code().unwrap_or("unknown"),
        err.message().map(str::to_string).unwrap_or_else(|| err.to_string())
    ))
}

#[async_trait]
impl StateStore for DynamoDbStateStore {
    async fn get(&self, deployment_id: &str) -> Result<Option<DateTime<Utc>>, ListenerError> {
        let response = self
            .client
            .get_item()
            .table_name(&self.table)
            .set_key(Some(key(deployment_id)))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| store_error("GetItem", e))?;

        match response.item() {
            Some(item) => Ok(Some(created_at_from_item(deployment_id, item)?)),
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        deployment_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), ListenerError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(item(deployment_id, created_at)))
            .send()
            .await
            .map_err(|e| store_error("PutItem", e))?;

        debug!("Tracked {} in {}", deployment_id, self.table);
        Ok(())
    }

    async fn delete(&self, deployment_id: &str) -> Result<(), ListenerError> {
        self.client
            .delete_item()
            .table_name(&self.table)
            .set_key(Some(key(deployment_id)))
            .send()
            .await
            .map_err(|e| store_error("DeleteItem", e))?;

        debug!("Untracked {} in {}", deployment_id, self.table);
        Ok(())
    }
}
