//! POST /api/save-profile and GET /api/get-profile: shareable profile codes.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::App;
use crate::codes::ShortCode;
use crate::models::timestamp;
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
pub struct SaveProfileRequest {
    pub profile: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveProfileResponse {
    pub code: ShortCode,
    #[serde(with = "timestamp")]
    pub expires_at: DateTime<Utc>,
    pub kv_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GetProfileQuery {
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProfileResponse {
    pub profile: Value,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub expires_at: DateTime<Utc>,
}

/// Handler: POST /api/save-profile
///
/// Always answers 200 with a code once the payload is valid; `kvEnabled`
/// tells the caller whether the code can be looked up later.
pub async fn save_profile(
    State(app): State<App>,
    payload: std::result::Result<Json<SaveProfileRequest>, JsonRejection>,
) -> Result<Json<SaveProfileResponse>> {
    let Json(request) = payload?;

    let profile = match request.profile {
        None | Some(Value::Null) => {
            return Err(Error::BadRequest("No profile data provided".to_string()))
        }
        Some(profile) if !profile.is_object() => {
            return Err(Error::BadRequest(
                "Profile data must be a JSON object".to_string(),
            ))
        }
        Some(profile) => profile,
    };

    let saved = app.codes().save(&profile).await;

    Ok(Json(SaveProfileResponse {
        code: saved.code,
        expires_at: saved.expires_at,
        kv_enabled: saved.persisted,
        warning: saved.warning,
    }))
}

/// Handler: GET /api/get-profile?code=XXXXXX
pub async fn get_profile(
    State(app): State<App>,
    query: std::result::Result<Query<GetProfileQuery>, QueryRejection>,
) -> Result<Json<GetProfileResponse>> {
    let Query(query) = query?;

    let code = query
        .code
        .as_deref()
        .and_then(ShortCode::parse)
        .ok_or_else(|| Error::BadRequest("Invalid code format".to_string()))?;

    let record = app.codes().load(&code).await?;

    Ok(Json(GetProfileResponse {
        profile: record.profile,
        created_at: record.created_at,
        expires_at: record.expires_at,
    }))
}
