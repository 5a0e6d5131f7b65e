// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Wire contract of the `/v1` API. Transport-free: the server crate owns
//! sockets, this crate owns shapes and the error-to-status table.

pub mod dto;
pub mod error_mapping;
mod errors;
pub mod openapi;
pub mod params;

pub use dto::{
    ApiResponseEnvelope, ContractDto, CreateContractRequestDto, CreateListingRequestDto,
    FarmerProfileDto, ListingDto, LoginRequestDto, RegisterRequestDto, SessionDto,
    TransitionRequestDto, UserDto,
};
pub use errors::{ApiError, ApiErrorCode, API_ERROR_CODES};
pub use openapi::openapi_v1_spec;
pub use params::{parse_contract_list_params, parse_json_body, ContractListParams};

pub const CRATE_NAME: &str = "cropconnect-api";
pub const API_VERSION: &str = "v1";
