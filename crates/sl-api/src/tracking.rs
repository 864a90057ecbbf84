use axum::extract::{Path, State};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sl_core::{TimelineEvent, TrackingEntry, TrackingError, TrackingNumber, TrackingStatus};

use crate::{ApiError, ApiResult, AppState};

/// Body of `POST /api/tracking`. Unknown keys are dropped on deserialisation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingPayload {
    pub number: Option<String>,
    pub status: Option<String>,
    pub status_text: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub estimated_delivery: Option<String>,
    pub package_type: Option<String>,
    pub weight: Option<String>,
    pub dimensions: Option<String>,
    pub insurance: Option<String>,
    pub timeline: Option<Vec<TimelineEvent>>,
}

impl TrackingPayload {
    pub(crate) fn into_entry(self) -> ApiResult<TrackingEntry> {
        let number = self
            .number
            .as_deref()
            .map(TrackingNumber::parse)
            .transpose()
            .ok()
            .flatten()
            .ok_or_else(|| ApiError::bad_request("number required"))?;
        let status = self
            .status
            .as_deref()
            .ok_or_else(|| ApiError::bad_request("status required"))?
            .parse::<TrackingStatus>()
            .map_err(|err: TrackingError| ApiError::bad_request(err.to_string()))?;

        let entry = TrackingEntry {
            number,
            status,
            status_text: self.status_text,
            origin: self.origin,
            destination: self.destination,
            estimated_delivery: self.estimated_delivery,
            package_type: self.package_type,
            weight: self.weight,
            dimensions: self.dimensions,
            insurance: self.insurance,
            timeline: self.timeline.unwrap_or_default(),
        };
        Ok(entry.normalized())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTracking {
    #[serde(flatten)]
    pub entry: TrackingEntry,
    pub updated_at: String,
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn decode_row((document, updated_at): (String, String)) -> ApiResult<StoredTracking> {
    let entry = serde_json::from_str::<TrackingEntry>(&document)?;
    Ok(StoredTracking { entry, updated_at })
}

fn parse_path_number(raw: &str) -> ApiResult<TrackingNumber> {
    TrackingNumber::parse(raw).map_err(|_| ApiError::not_found("Not found"))
}

pub async fn list_tracking(State(state): State<AppState>) -> ApiResult<Json<Vec<StoredTracking>>> {
    let rows = sqlx::query_as::<_, (String, String)>(
        "SELECT document, updated_at FROM tracking_entries ORDER BY number ASC",
    )
    .fetch_all(&state.pool)
    .await?;

    let entries = rows
        .into_iter()
        .map(decode_row)
        .collect::<ApiResult<Vec<_>>>()?;
    Ok(Json(entries))
}

pub async fn get_tracking(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> ApiResult<Json<StoredTracking>> {
    let number = parse_path_number(&number)?;
    let row = sqlx::query_as::<_, (String, String)>(
        "SELECT document, updated_at FROM tracking_entries WHERE number = ?1",
    )
    .bind(number.as_str())
    .fetch_optional(&state.pool)
    .await?;

    match row {
        Some(row) => Ok(Json(decode_row(row)?)),
        None => Err(ApiError::not_found("Not found")),
    }
}

pub async fn upsert_tracking(
    State(state): State<AppState>,
    Json(payload): Json<TrackingPayload>,
) -> ApiResult<Json<StoredTracking>> {
    let entry = payload.into_entry()?;
    let document = serde_json::to_string(&entry)?;
    let now = now_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO tracking_entries (number, status, document, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?4)
        ON CONFLICT(number) DO UPDATE SET
            status = excluded.status,
            document = excluded.document,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(entry.number.as_str())
    .bind(entry.status.as_str())
    .bind(&document)
    .bind(&now)
    .execute(&state.pool)
    .await?;

    tracing::info!(number = %entry.number, status = %entry.status, "tracking entry stored");
    Ok(Json(StoredTracking {
        entry,
        updated_at: now,
    }))
}

pub async fn delete_tracking(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> ApiResult<Json<Value>> {
    if let Ok(number) = TrackingNumber::parse(&number) {
        let result = sqlx::query("DELETE FROM tracking_entries WHERE number = ?1")
            .bind(number.as_str())
            .execute(&state.pool)
            .await?;
        tracing::info!(
            number = %number,
            removed = result.rows_affected(),
            "tracking entry deleted"
        );
    }
    Ok(Json(json!({ "ok": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_requires_number() {
        let payload = TrackingPayload {
            number: Some("  ".into()),
            status: Some("pending".into()),
            ..Default::default()
        };
        let err = payload.into_entry().unwrap_err();
        assert_eq!(err.message, "number required");
    }

    #[test]
    fn payload_rejects_unknown_status() {
        let payload = TrackingPayload {
            number: Some("ab1".into()),
            status: Some("lost".into()),
            ..Default::default()
        };
        let err = payload.into_entry().unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn payload_is_sanitised() {
        let payload: TrackingPayload = serde_json::from_value(json!({
            "number": "ab100",
            "status": "in-transit",
            "_unsynced": true,
            "timeline": [
                { "date": "", "title": "", "description": "", "location": "" },
                { "date": "2024-01-10 08:30", "title": "Picked up", "active": true }
            ]
        }))
        .unwrap();

        let entry = payload.into_entry().unwrap();
        assert_eq!(entry.number.as_str(), "AB100");
        assert_eq!(entry.status_text.as_deref(), Some("In Transit"));
        assert_eq!(entry.timeline.len(), 1);
    }
}
