use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::Subscription;
use crate::store::SubscriptionStore;
use crate::{Error, Result};

/// Version stamp written into every export document.
pub const EXPORT_VERSION: &str = "1.0";

/// The on-disk backup format: the full collection plus metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub subscriptions: Vec<Subscription>,
    pub export_date: DateTime<Utc>,
    pub version: String,
}

/// Snapshot the store into an export document.
pub async fn export_store(store: &mut SubscriptionStore) -> Result<ExportDocument> {
    Ok(ExportDocument {
        subscriptions: store.get_all().await?,
        export_date: Utc::now(),
        version: EXPORT_VERSION.to_string(),
    })
}

/// Serialize an export document to pretty JSON.
pub fn to_json(doc: &ExportDocument) -> Result<String> {
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Parse an import document, strictly enough to give a useful message.
///
/// We go through `Value` first instead of deserializing the document
/// directly: "the subscriptions field is missing" beats serde's
/// field-by-field complaint for a file a user hand-edited.
pub fn parse_import(json: &str) -> Result<Vec<Subscription>> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| Error::ImportFormat(format!("not valid JSON: {}", e)))?;

    let subs = value
        .get("subscriptions")
        .ok_or_else(|| Error::ImportFormat("missing `subscriptions` field".to_string()))?;

    if !subs.is_array() {
        return Err(Error::ImportFormat(
            "`subscriptions` must be an array".to_string(),
        ));
    }

    serde_json::from_value(subs.clone())
        .map_err(|e| Error::ImportFormat(format!("bad subscription record: {}", e)))
}

/// Import a JSON document into the store. Records keep their ids when
/// present; absent ids are assigned by `add`. Returns how many records
/// went in.
pub async fn import_into(store: &mut SubscriptionStore, json: &str) -> Result<usize> {
    let subs = parse_import(json)?;
    let count = subs.len();

    for sub in subs {
        store.add(sub).await?;
    }

    info!("imported {} subscriptions", count);
    Ok(count)
}
