//! Feature Catalogue Command

use axum::http::StatusCode;
use axum::Json;

use marketlens_core::Feature;

use crate::commands::ApiResponse;
use crate::models::analysis::FeatureInfo;
use crate::models::response::CommandResponse;

/// List every analysis feature
pub async fn list_features() -> ApiResponse<Vec<FeatureInfo>> {
    let features = Feature::ALL.into_iter().map(FeatureInfo::from).collect();
    (StatusCode::OK, Json(CommandResponse::ok(features)))
}
