// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Contract lifecycle manager.
//!
//! Every operation takes the caller as an explicit [`Actor`]; nothing here
//! reads ambient session state. Status literals and identifiers arrive as raw
//! strings and are normalized before any store access.

mod accounts;
mod catalog;
mod error;
mod manager;
mod password;
mod policy;

pub use accounts::Registration;
pub use error::LifecycleError;
pub use manager::{ContractLifecycleManager, ContractRequest};
pub use password::{hash_password, verify_password, PASSWORD_MIN_LEN};
pub use policy::{
    LifecyclePolicy, ENV_CROPCONNECT_ALLOW_PAST_DELIVERY, ENV_CROPCONNECT_BUYER_MAY_CANCEL,
    ENV_CROPCONNECT_PASSWORD_ITERATIONS,
};

pub use cropconnect_model::Actor;

pub const CRATE_NAME: &str = "cropconnect-lifecycle";
