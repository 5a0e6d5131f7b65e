// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Shared primitives used by every CropConnect crate.
//!
//! Nothing in here knows about listings or contracts; it carries process exit
//! codes, the machine-readable error envelope, the clock port and the hashing
//! helpers used for password storage and session signing.

mod crypto;
mod errors;
pub mod ports;

pub use crate::crypto::{constant_time_eq, hex_encode, hmac_sha256};
pub use crate::errors::{ErrorContext, ExitCode, MachineError, ResultExt};
pub use crate::ports::{ClockPort, FixedClock, SystemClock};

pub const CRATE_NAME: &str = "cropconnect-core";

pub const ENV_CROPCONNECT_LOG_JSON: &str = "CROPCONNECT_LOG_JSON";
pub const ENV_CROPCONNECT_DB_PATH: &str = "CROPCONNECT_DB_PATH";
pub const ENV_CROPCONNECT_SESSION_SECRET: &str = "CROPCONNECT_SESSION_SECRET";

pub const DEFAULT_DB_PATH: &str = "artifacts/cropconnect.sqlite";
