//! POST /api/compatibility: compares two profiles given by code or screenshot.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::ai::ScreenshotImage;
use crate::app::App;
use crate::codes::ShortCode;
use crate::models::{Party, ProfileSource};
use crate::{canned, Error, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityRequest {
    pub user: Option<Value>,
    pub crush: Option<Value>,
    #[serde(default)]
    pub use_mock: bool,
}

/// Reads one `{ type, value }` descriptor.
fn parse_source(party: Party, raw: Value) -> Result<ProfileSource> {
    serde_json::from_value(raw)
        .map_err(|e| Error::BadRequest(format!("Invalid {} descriptor: {}", party, e)))
}

/// Resolves one side to its profile document.
async fn resolve_profile(app: &App, party: Party, source: &ProfileSource) -> Result<Value> {
    let not_found = || Error::NotFound(format!("{} profile code not found", party));

    match source {
        ProfileSource::Code(raw) => {
            let code = ShortCode::parse(raw).ok_or_else(not_found)?;
            match app.codes().load(&code).await {
                Ok(record) => Ok(record.profile),
                Err(Error::NotFound(_)) => Err(not_found()),
                Err(e) => Err(e),
            }
        }
        ProfileSource::Screenshot(data) => {
            info!("Building {} profile from screenshot", party);
            let image = ScreenshotImage::from_base64(data)?;
            app.analyzer().profile_from_screenshot(&image).await
        }
    }
}

/// Handler: POST /api/compatibility
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:3000/api/compatibility \
///   -H 'content-type: application/json' \
///   -d '{"user":{"type":"code","value":"K7M2QX"},"crush":{"type":"screenshot","value":"iVBORw0..."}}'
/// ```
pub async fn compatibility(
    State(app): State<App>,
    payload: std::result::Result<Json<CompatibilityRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(request) = payload?;

    let (user, crush) = match (request.user, request.crush) {
        (Some(user), Some(crush)) => (user, crush),
        _ => {
            return Err(Error::BadRequest(
                "Both user and crush data required".to_string(),
            ))
        }
    };

    if app.mock_requested(request.use_mock) {
        info!("Debug mode: returning canned compatibility report");
        return Ok(Json(canned::compatibility_envelope()?));
    }

    let user = parse_source(Party::User, user)?;
    let crush = parse_source(Party::Crush, crush)?;

    let (user_profile, crush_profile) = tokio::try_join!(
        resolve_profile(&app, Party::User, &user),
        resolve_profile(&app, Party::Crush, &crush)
    )?;

    let envelope = app.analyzer().compare(&user_profile, &crush_profile).await?;
    Ok(Json(envelope))
}
