//! User routes

use super::{AppState, caller::Caller, error::ApiResult};
use crate::{
    core::{
        account,
        user::{self, UserProfile},
    },
    entities::UserModel,
};
use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

/// Body of `PATCH /users/update-phone`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePhoneRequest {
    /// New phone number
    pub phone_number: String,
}

/// GET /users/me
pub async fn get_me(State(state): State<AppState>, caller: Caller) -> ApiResult<Json<UserProfile>> {
    let profile = user::get_user_profile(&state.db, caller.user_id()).await?;
    Ok(Json(profile))
}

/// PATCH /users/update-phone
pub async fn update_phone(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<UpdatePhoneRequest>,
) -> ApiResult<Json<UserModel>> {
    let updated = user::update_phone_number(&state.db, caller.user_id(), &req.phone_number).await?;
    Ok(Json(updated))
}

/// DELETE /users
/// Deletes the caller's account with everything it hosts
pub async fn delete_me(State(state): State<AppState>, caller: Caller) -> ApiResult<Json<Value>> {
    account::delete_user_account(&state.db, caller.user_id()).await?;
    Ok(Json(json!({ "deleted": true })))
}
