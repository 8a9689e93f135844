use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::sync::Arc;

use crate::calendar::{Checklist, ChecklistItem, CourtesyEvent, EventDraft, EventType};
use crate::storage::config::Config;
use crate::sync::identity::{Identity, TokenSource};
use crate::sync::store::{EventStore, StoreError};

const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const EVENTS_COLLECTION: &str = "events";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    document: Option<Document>,
}

/// Per-user event collection in Firestore, reached over the REST API.
///
/// Documents live at `artifacts/{app_id}/users/{uid}/events/{id}`.
pub struct FirestoreStore {
    base_url: String,
    project_id: String,
    app_id: String,
    tokens: Arc<dyn TokenSource>,
    client: reqwest::Client,
}

impl FirestoreStore {
    pub fn new(project_id: String, app_id: String, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            base_url: DEFAULT_FIRESTORE_BASE_URL.to_string(),
            project_id,
            app_id,
            tokens,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config, tokens: Arc<dyn TokenSource>) -> Self {
        let store = Self::new(
            config.backend.project_id.clone(),
            config.backend.app_id.clone(),
            tokens,
        );
        match &config.backend.firestore_base_url {
            Some(url) => store.with_base_url(url.clone()),
            None => store,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn database_name(&self) -> String {
        format!("projects/{}/databases/(default)", self.project_id)
    }

    fn user_resource(&self, app_id: &str, uid: &str) -> String {
        format!("{}/documents/artifacts/{}/users/{}", self.database_name(), app_id, uid)
    }

    /// Raw resource name, as it appears inside request bodies.
    fn document_name(&self, identity: &Identity, id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.user_resource(&self.app_id, &identity.uid),
            EVENTS_COLLECTION,
            id
        )
    }

    fn user_url(&self, identity: &Identity) -> String {
        self.url(&self.user_resource(
            &urlencoding::encode(&self.app_id),
            &urlencoding::encode(&identity.uid),
        ))
    }

    fn document_url(&self, identity: &Identity, id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.user_url(identity),
            EVENTS_COLLECTION,
            urlencoding::encode(id)
        )
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource)
    }

    async fn check_status(response: reqwest::Response, what: &str) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        tracing::info!("{} response status: {}", what, status);

        if status == 401 || status == 403 {
            tracing::error!("Permission denied during {}", what);
            return Err(StoreError::PermissionDenied);
        }

        if status == 404 {
            tracing::error!("Document not found during {}", what);
            return Err(StoreError::NotFound(what.to_string()));
        }

        if status == 409 {
            return Err(StoreError::AlreadyExists(what.to_string()));
        }

        if !status.is_success() {
            let body = response.text().await?;
            tracing::error!("{} failed. Status: {}, Body: {}", what, status, body);
            return Err(StoreError::RequestError(format!("Status {}: {}", status, body)));
        }

        Ok(response)
    }
}

fn string_value(value: &str) -> Value {
    json!({ "stringValue": value })
}

fn bool_value(value: bool) -> Value {
    json!({ "booleanValue": value })
}

fn encode_checklist(checklist: &Checklist) -> Value {
    let fields: Map<String, Value> = ChecklistItem::ALL
        .into_iter()
        .map(|item| (item.key().to_string(), bool_value(checklist.get(item))))
        .collect();
    json!({ "mapValue": { "fields": fields } })
}

fn encode_draft(draft: &EventDraft) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("companyName".to_string(), string_value(&draft.company_name));
    fields.insert("eventType".to_string(), string_value(draft.event_type.label()));
    fields.insert("date".to_string(), string_value(&draft.date));
    fields.insert("note".to_string(), string_value(&draft.note));
    fields.insert("checklist".to_string(), encode_checklist(&draft.checklist));
    fields.insert("isCompleted".to_string(), bool_value(draft.is_completed.unwrap_or(false)));
    fields
}

fn get_string(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key)?.get("stringValue")?.as_str().map(String::from)
}

fn get_bool(fields: &Map<String, Value>, key: &str) -> bool {
    fields
        .get(key)
        .and_then(|v| v.get("booleanValue"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn get_timestamp(fields: &Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    let raw = fields.get(key)?.get("timestampValue")?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

fn decode_checklist(fields: &Map<String, Value>) -> Checklist {
    let Some(inner) = fields
        .get("checklist")
        .and_then(|v| v.get("mapValue"))
        .and_then(|v| v.get("fields"))
        .and_then(Value::as_object)
    else {
        return Checklist::default();
    };

    let mut checklist = Checklist::default();
    for item in ChecklistItem::ALL {
        checklist.set(item, get_bool(inner, item.key()));
    }
    checklist
}

fn decode_document(document: Document) -> Result<CourtesyEvent, StoreError> {
    let id = document.name
        .rsplit('/')
        .next()
        .map(|segment| urlencoding::decode(segment).map(|s| s.into_owned()).unwrap_or_else(|_| segment.to_string()))
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| StoreError::ParseError(format!("Invalid document name: {}", document.name)))?;

    let fields = &document.fields;
    let company_name = get_string(fields, "companyName")
        .ok_or_else(|| StoreError::ParseError(format!("Missing companyName in {}", id)))?;
    let date = get_string(fields, "date")
        .ok_or_else(|| StoreError::ParseError(format!("Missing date in {}", id)))?;

    Ok(CourtesyEvent {
        company_name,
        event_type: get_string(fields, "eventType")
            .map(|label| EventType::from_label(&label))
            .unwrap_or_default(),
        date,
        note: get_string(fields, "note").unwrap_or_default(),
        checklist: decode_checklist(fields),
        is_completed: get_bool(fields, "isCompleted"),
        created_at: get_timestamp(fields, "createdAt"),
        id,
    })
}

#[async_trait]
impl EventStore for FirestoreStore {
    async fn list(&self, identity: &Identity) -> Result<Vec<CourtesyEvent>, StoreError> {
        let token = self.tokens.id_token().await?;
        let url = format!("{}:runQuery", self.user_url(identity));
        let query = json!({
            "structuredQuery": {
                "from": [{ "collectionId": EVENTS_COLLECTION }],
                "orderBy": [{ "field": { "fieldPath": "date" }, "direction": "ASCENDING" }]
            }
        });

        let response = self.client
            .post(&url)
            .bearer_auth(&token)
            .json(&query)
            .send()
            .await?;
        let response = Self::check_status(response, "list events").await?;

        let results: Vec<QueryResult> = response.json().await?;
        let events: Vec<CourtesyEvent> = results
            .into_iter()
            .filter_map(|result| result.document)
            .filter_map(|document| match decode_document(document) {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::warn!("Skipping undecodable event document: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!("Listed {} events", events.len());
        Ok(events)
    }

    async fn create(
        &self,
        identity: &Identity,
        id: &str,
        draft: &EventDraft,
    ) -> Result<(), StoreError> {
        let token = self.tokens.id_token().await?;
        let url = format!("{}:commit", self.url(&format!("{}/documents", self.database_name())));
        let body = json!({
            "writes": [{
                "update": {
                    "name": self.document_name(identity, id),
                    "fields": encode_draft(draft),
                },
                "updateTransforms": [{
                    "fieldPath": "createdAt",
                    "setToServerValue": "REQUEST_TIME"
                }],
                "currentDocument": { "exists": false }
            }]
        });

        tracing::info!("Creating event {} for {} on {}", id, draft.company_name, draft.date);

        let response = self.client
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;
        Self::check_status(response, "create event").await?;
        Ok(())
    }

    async fn patch_checklist(
        &self,
        identity: &Identity,
        id: &str,
        item: ChecklistItem,
        value: bool,
        is_completed: bool,
    ) -> Result<(), StoreError> {
        let token = self.tokens.id_token().await?;
        let url = self.document_url(identity, id);
        let checklist_path = format!("checklist.{}", item.key());
        let mut toggled = Map::new();
        toggled.insert(item.key().to_string(), bool_value(value));
        let body = json!({
            "fields": {
                "checklist": { "mapValue": { "fields": toggled } },
                "isCompleted": bool_value(is_completed),
            }
        });

        tracing::info!("Patching {} on event {} to {}", checklist_path, id, value);

        let response = self.client
            .patch(&url)
            .bearer_auth(&token)
            .query(&[
                ("updateMask.fieldPaths", checklist_path.as_str()),
                ("updateMask.fieldPaths", "isCompleted"),
                ("currentDocument.exists", "true"),
            ])
            .json(&body)
            .send()
            .await?;
        Self::check_status(response, "patch checklist").await?;
        Ok(())
    }

    async fn delete(&self, identity: &Identity, id: &str) -> Result<(), StoreError> {
        let token = self.tokens.id_token().await?;
        let url = self.document_url(identity, id);

        tracing::info!("Deleting event {}", id);

        let response = self.client
            .delete(&url)
            .bearer_auth(&token)
            .send()
            .await?;
        Self::check_status(response, "delete event").await?;
        Ok(())
    }
}
