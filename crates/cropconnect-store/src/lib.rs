// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod error;
mod rows;
mod schema;
mod sqlite;
mod traits;

pub use error::{StoreError, StoreErrorCode};
pub use schema::SCHEMA_VERSION;
pub use sqlite::{SqliteStore, StoreStats, BUSY_TIMEOUT};
pub use traits::{AccountStore, ContractStore, ListingStore, MarketplaceStore, UserCredentials};

pub const CRATE_NAME: &str = "cropconnect-store";
