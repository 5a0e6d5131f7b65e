// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use cropconnect_api::error_mapping::map_error;
use cropconnect_api::{
    openapi_v1_spec, parse_contract_list_params, parse_json_body, ApiError, ApiResponseEnvelope,
    ContractDto, CreateContractRequestDto, CreateListingRequestDto, FarmerProfileDto, ListingDto,
    LoginRequestDto, RegisterRequestDto, SessionDto, TransitionRequestDto, UserDto, API_VERSION,
};
use cropconnect_lifecycle::{Actor, LifecycleError, Registration};
use cropconnect_model::NewListing;
use cropconnect_store::SCHEMA_VERSION;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::request_tracing::RequestId;
use crate::state::{AppState, Manager};
use crate::CRATE_NAME;

pub(crate) fn api_error_response(err: ApiError, request_id: &str) -> Response {
    let err = err.with_request_id(request_id);
    let status = StatusCode::from_u16(map_error(&err).status_code)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::error!(code = err.code.as_str(), message = %err.message, "request failed");
    } else {
        tracing::info!(code = err.code.as_str(), "request rejected");
    }
    (status, Json(json!({ "error": err }))).into_response()
}

fn data_response<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(ApiResponseEnvelope::new(data))).into_response()
}

fn respond(request_id: &str, result: Result<Response, ApiError>) -> Response {
    result.unwrap_or_else(|err| api_error_response(err, request_id))
}

/// Runs a lifecycle call on the blocking pool; sqlite access is synchronous.
async fn blocking<T, F>(state: &AppState, work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Manager) -> Result<T, LifecycleError> + Send + 'static,
{
    let manager = state.manager.clone();
    tokio::task::spawn_blocking(move || work(&manager))
        .await
        .map_err(|e| ApiError::internal(format!("blocking task failed: {e}")))?
        .map_err(ApiError::from)
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Actor, ApiError> {
    let raw = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthenticated("missing bearer token"))?;
    let token = raw
        .split_once(' ')
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthenticated("authorization header is not a bearer token"))?;
    let claims = state
        .sessions
        .verify(token, state.clock.now())
        .map_err(|e| ApiError::unauthenticated(e.to_string()))?;
    claims
        .actor()
        .map_err(|e| ApiError::unauthenticated(e.to_string()))
}

fn read_body<T: DeserializeOwned>(
    state: &AppState,
    body: Result<Bytes, BytesRejection>,
) -> Result<T, ApiError> {
    match body {
        Ok(bytes) => parse_json_body(&bytes),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(ApiError::payload_too_large(state.api.max_body_bytes))
        }
        Err(rejection) => Err(ApiError::invalid_body(rejection.body_text())),
    }
}

pub(crate) async fn healthz_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub(crate) async fn readyz_handler(
    State(state): State<AppState>,
    request_id: RequestId,
) -> Response {
    if !state.ready.load(std::sync::atomic::Ordering::Relaxed) {
        return api_error_response(
            ApiError::not_ready("server is not accepting traffic"),
            &request_id.0,
        );
    }
    let manager = state.manager.clone();
    match tokio::task::spawn_blocking(move || manager.store().stats()).await {
        Ok(Ok(_)) => (StatusCode::OK, "ready").into_response(),
        Ok(Err(e)) => api_error_response(ApiError::not_ready(e.to_string()), &request_id.0),
        Err(e) => api_error_response(ApiError::not_ready(e.to_string()), &request_id.0),
    }
}

pub(crate) async fn version_handler() -> impl IntoResponse {
    Json(json!({
        "service": CRATE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "api_version": API_VERSION,
        "schema_version": SCHEMA_VERSION,
    }))
}

pub(crate) async fn openapi_handler() -> impl IntoResponse {
    Json(openapi_v1_spec())
}

pub(crate) async fn route_not_found_handler(request_id: RequestId, uri: Uri) -> Response {
    api_error_response(ApiError::route_not_found(uri.path()), &request_id.0)
}

pub(crate) async fn register_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = async {
        let dto: RegisterRequestDto = read_body(&state, body)?;
        let registration = Registration::from(dto);
        let user = blocking(&state, move |m| m.register(registration)).await?;
        Ok::<_, ApiError>(data_response(StatusCode::CREATED, UserDto::from(user)))
    }
    .await;
    respond(&request_id.0, result)
}

pub(crate) async fn login_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = async {
        let dto: LoginRequestDto = read_body(&state, body)?;
        let user = blocking(&state, move |m| {
            m.login(&dto.username, &dto.password, &dto.role)
        })
        .await?;
        let (token, expires_at) = state
            .sessions
            .issue(&user, state.clock.now())
            .map_err(|e| ApiError::internal(e.to_string()))?;
        tracing::info!(user_id = %user.id, "session issued");
        Ok::<_, ApiError>(data_response(
            StatusCode::OK,
            SessionDto {
                token,
                expires_at,
                user: UserDto::from(user),
            },
        ))
    }
    .await;
    respond(&request_id.0, result)
}

pub(crate) async fn session_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    headers: HeaderMap,
) -> Response {
    let result = async {
        let actor = authenticate(&state, &headers)?;
        let user = blocking(&state, move |m| m.current_user(&actor)).await?;
        Ok::<_, ApiError>(data_response(StatusCode::OK, UserDto::from(user)))
    }
    .await;
    respond(&request_id.0, result)
}

pub(crate) async fn list_listings_handler(
    State(state): State<AppState>,
    request_id: RequestId,
) -> Response {
    let result = async {
        let listings = blocking(&state, |m| m.list_listings()).await?;
        let dtos: Vec<ListingDto> = listings.into_iter().map(ListingDto::from).collect();
        Ok::<_, ApiError>(data_response(StatusCode::OK, dtos))
    }
    .await;
    respond(&request_id.0, result)
}

pub(crate) async fn create_listing_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = async {
        let actor = authenticate(&state, &headers)?;
        let dto: CreateListingRequestDto = read_body(&state, body)?;
        let listing = NewListing::try_from(dto)?;
        let created = blocking(&state, move |m| m.create_listing(&actor, listing)).await?;
        Ok::<_, ApiError>(data_response(StatusCode::CREATED, ListingDto::from(created)))
    }
    .await;
    respond(&request_id.0, result)
}

pub(crate) async fn get_listing_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(listing_id): Path<String>,
) -> Response {
    let result = async {
        let listing = blocking(&state, move |m| m.get_listing(&listing_id)).await?;
        Ok::<_, ApiError>(data_response(StatusCode::OK, ListingDto::from(listing)))
    }
    .await;
    respond(&request_id.0, result)
}

pub(crate) async fn delete_listing_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
) -> Response {
    let result = async {
        let actor = authenticate(&state, &headers)?;
        blocking(&state, move |m| m.delete_listing(&actor, &listing_id)).await?;
        Ok::<_, ApiError>(StatusCode::NO_CONTENT.into_response())
    }
    .await;
    respond(&request_id.0, result)
}

pub(crate) async fn farmer_listings_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    headers: HeaderMap,
) -> Response {
    let result = async {
        let actor = authenticate(&state, &headers)?;
        let listings = blocking(&state, move |m| m.list_farmer_listings(&actor)).await?;
        let dtos: Vec<ListingDto> = listings.into_iter().map(ListingDto::from).collect();
        Ok::<_, ApiError>(data_response(StatusCode::OK, dtos))
    }
    .await;
    respond(&request_id.0, result)
}

pub(crate) async fn farmer_profile_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    headers: HeaderMap,
) -> Response {
    let result = async {
        let actor = authenticate(&state, &headers)?;
        let profile = blocking(&state, move |m| m.farmer_profile(&actor)).await?;
        Ok::<_, ApiError>(data_response(StatusCode::OK, FarmerProfileDto::from(profile)))
    }
    .await;
    respond(&request_id.0, result)
}

pub(crate) async fn list_contracts_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    headers: HeaderMap,
    query: Result<Query<BTreeMap<String, String>>, QueryRejection>,
) -> Response {
    let result = async {
        let actor = authenticate(&state, &headers)?;
        let Query(query) =
            query.map_err(|e| ApiError::invalid_param("query", &e.body_text()))?;
        let params = parse_contract_list_params(&query)?;
        let contracts = blocking(&state, move |m| {
            m.list_contracts(&actor, params.status.as_deref())
        })
        .await?;
        let dtos: Vec<ContractDto> = contracts.into_iter().map(ContractDto::from).collect();
        Ok::<_, ApiError>(data_response(StatusCode::OK, dtos))
    }
    .await;
    respond(&request_id.0, result)
}

pub(crate) async fn create_contract_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = async {
        let actor = authenticate(&state, &headers)?;
        let dto: CreateContractRequestDto = read_body(&state, body)?;
        let created = blocking(&state, move |m| m.create_contract(&actor, dto.into())).await?;
        Ok::<_, ApiError>(data_response(StatusCode::CREATED, ContractDto::from(created)))
    }
    .await;
    respond(&request_id.0, result)
}

pub(crate) async fn get_contract_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    headers: HeaderMap,
    Path(contract_id): Path<String>,
) -> Response {
    let result = async {
        let actor = authenticate(&state, &headers)?;
        let contract = blocking(&state, move |m| m.get_contract(&actor, &contract_id)).await?;
        Ok::<_, ApiError>(data_response(StatusCode::OK, ContractDto::from(contract)))
    }
    .await;
    respond(&request_id.0, result)
}

pub(crate) async fn transition_contract_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    headers: HeaderMap,
    Path(contract_id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = async {
        let actor = authenticate(&state, &headers)?;
        let dto: TransitionRequestDto = read_body(&state, body)?;
        let contract = blocking(&state, move |m| {
            m.transition_status(&actor, &contract_id, &dto.status)
        })
        .await?;
        Ok::<_, ApiError>(data_response(StatusCode::OK, ContractDto::from(contract)))
    }
    .await;
    respond(&request_id.0, result)
}
