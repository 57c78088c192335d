//! Client routes

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use invoicely_billing::ActingAccount;
use invoicely_shared::Pagination;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    resources::{ClientListResource, ClientResource},
    state::AppState,
    validation::CreateClientRequest,
};

#[derive(Debug, Deserialize)]
pub struct ListClientsQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create a client for the acting account
///
/// Mounted behind the client quota gate. The quota is checked again inside
/// the insert transaction, so a concurrent request that slipped past the gate
/// still gets the same 403.
pub async fn create_client(
    State(state): State<AppState>,
    Extension(acting): Extension<ActingAccount>,
    payload: Result<Json<CreateClientRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ClientResource>)> {
    let Json(req) = payload?;
    let new_client = req.validate().map_err(ApiError::Validation)?;

    let client = state
        .billing
        .clients
        .create_client(&acting.account, acting.privileges(), new_client)
        .await?;

    state
        .email
        .spawn_client_welcome(client.clone(), acting.account.clone());

    Ok((StatusCode::CREATED, Json(ClientResource::from(client))))
}

pub async fn list_clients(
    State(state): State<AppState>,
    Extension(acting): Extension<ActingAccount>,
    Query(query): Query<ListClientsQuery>,
) -> ApiResult<Json<ClientListResource>> {
    let pagination = Pagination::new(query.page, query.per_page);
    let page = state
        .billing
        .clients
        .list_clients(acting.account.id, pagination)
        .await?;

    Ok(Json(ClientListResource::from(page)))
}

pub async fn get_client(
    State(state): State<AppState>,
    Extension(acting): Extension<ActingAccount>,
    Path(client_id): Path<Uuid>,
) -> ApiResult<Json<ClientResource>> {
    let client = state
        .billing
        .clients
        .get_client(acting.account.id, client_id)
        .await?;

    Ok(Json(ClientResource::from(client)))
}
