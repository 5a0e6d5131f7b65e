// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;

use crate::errors::ApiError;

pub const CONTRACT_LIST_PARAMS: [&str; 1] = ["status"];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContractListParams {
    /// Raw status literal; normalized by the lifecycle manager.
    pub status: Option<String>,
}

pub fn parse_contract_list_params(
    query: &BTreeMap<String, String>,
) -> Result<ContractListParams, ApiError> {
    if let Some((key, value)) = query
        .iter()
        .find(|(key, _)| !CONTRACT_LIST_PARAMS.contains(&key.as_str()))
    {
        return Err(ApiError::invalid_param(key, value));
    }
    let status = match query.get("status").map(|s| s.trim()) {
        None => None,
        Some("") => return Err(ApiError::invalid_param("status", "")),
        Some(raw) => Some(raw.to_string()),
    };
    Ok(ContractListParams { status })
}

/// Strict JSON body decode; unknown fields and empty bodies are rejected.
pub fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::invalid_body("request body is empty"));
    }
    serde_json::from_slice(body).map_err(|e| ApiError::invalid_body(e.to_string()))
}
