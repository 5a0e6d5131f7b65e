// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! CropConnect model SSOT.
//!
//! Every type here is a plain value: stores assemble them, the lifecycle
//! manager consumes them, nothing lazily loads relations.
//!
//! ```compile_fail
//! use cropconnect_model::ContractStatus;
//!
//! fn exhaustive_match(s: ContractStatus) -> &'static str {
//!     match s {
//!         ContractStatus::Pending => "p",
//!         ContractStatus::Accepted => "a",
//!     }
//! }
//! ```

mod account;
mod contract;
mod ids;
mod listing;
mod validation;

pub use account::{
    Actor, BuyerProfile, FarmerDetails, FarmerProfile, NewUser, Role, User, USERNAME_MAX_LEN,
    USERNAME_MIN_LEN,
};
pub use contract::{Contract, ContractStatus, NewContract, CONTRACT_TRANSITIONS, NOTES_MAX_LEN};
pub use ids::{BuyerId, ContractId, FarmerId, ListingId, UserId, ID_MAX_LEN};
pub use listing::{Listing, Location, NewListing, LISTING_NAME_MAX_LEN};
pub use validation::ValidationError;

pub const CRATE_NAME: &str = "cropconnect-model";
