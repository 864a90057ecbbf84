use axum::extract::State;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sl_core::ContactInfo;

use crate::{ApiResult, AppState};

const CONTACT_ID: &str = "contact";

/// Body of `POST /api/contact`. Absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct ContactPayload {
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub hours: Option<String>,
}

impl ContactPayload {
    fn apply_to(self, mut current: ContactInfo) -> ContactInfo {
        if let Some(address) = self.address {
            current.address = address;
        }
        if let Some(phone) = self.phone {
            current.phone = phone;
        }
        if let Some(email) = self.email {
            current.email = email;
        }
        if let Some(hours) = self.hours {
            current.hours = hours;
        }
        current
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    #[serde(flatten)]
    pub info: ContactInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

async fn load_contact(state: &AppState) -> ApiResult<Option<(ContactInfo, String)>> {
    let row = sqlx::query_as::<_, (String, String, String, String, String)>(
        "SELECT address, phone, email, hours, updated_at FROM contact_info WHERE id = ?1",
    )
    .bind(CONTACT_ID)
    .fetch_optional(&state.pool)
    .await?;

    Ok(row.map(|(address, phone, email, hours, updated_at)| {
        (
            ContactInfo {
                address,
                phone,
                email,
                hours,
            },
            updated_at,
        )
    }))
}

pub async fn get_contact(State(state): State<AppState>) -> ApiResult<Json<ContactResponse>> {
    let response = match load_contact(&state).await? {
        Some((info, updated_at)) => ContactResponse {
            info,
            updated_at: Some(updated_at),
        },
        None => ContactResponse {
            info: ContactInfo::default(),
            updated_at: None,
        },
    };
    Ok(Json(response))
}

pub async fn save_contact(
    State(state): State<AppState>,
    Json(payload): Json<ContactPayload>,
) -> ApiResult<Json<ContactResponse>> {
    let current = load_contact(&state)
        .await?
        .map(|(info, _)| info)
        .unwrap_or_default();
    let info = payload.apply_to(current);
    let updated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

    sqlx::query(
        r#"
        INSERT INTO contact_info (id, address, phone, email, hours, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(id) DO UPDATE SET
            address = excluded.address,
            phone = excluded.phone,
            email = excluded.email,
            hours = excluded.hours,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(CONTACT_ID)
    .bind(&info.address)
    .bind(&info.phone)
    .bind(&info.email)
    .bind(&info.hours)
    .bind(&updated_at)
    .execute(&state.pool)
    .await?;

    tracing::info!("contact info stored");
    Ok(Json(ContactResponse {
        info,
        updated_at: Some(updated_at),
    }))
}
