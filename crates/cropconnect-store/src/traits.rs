// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use cropconnect_model::{
    BuyerId, BuyerProfile, Contract, ContractId, ContractStatus, FarmerId, FarmerProfile,
    Listing, ListingId, NewContract, NewListing, NewUser, User, UserId,
};

use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

pub trait AccountStore: Send + Sync {
    /// Inserts the user and its role profile in one transaction.
    /// A taken username fails with `Conflict`.
    fn create_user(
        &self,
        user: &NewUser,
        password_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<User, StoreError>;
    fn find_credentials(&self, username: &str) -> Result<Option<UserCredentials>, StoreError>;
    fn get_user(&self, id: &UserId) -> Result<Option<User>, StoreError>;
    fn farmer_profile_for_user(&self, id: &UserId) -> Result<Option<FarmerProfile>, StoreError>;
    fn buyer_profile_for_user(&self, id: &UserId) -> Result<Option<BuyerProfile>, StoreError>;
}

pub trait ListingStore: Send + Sync {
    fn create_listing(
        &self,
        farmer_id: &FarmerId,
        listing: &NewListing,
        at: DateTime<Utc>,
    ) -> Result<Listing, StoreError>;
    fn get_listing(&self, id: &ListingId) -> Result<Option<Listing>, StoreError>;
    fn list_listings(&self) -> Result<Vec<Listing>, StoreError>;
    fn list_farmer_listings(&self, farmer_id: &FarmerId) -> Result<Vec<Listing>, StoreError>;
    /// `NotFound` when missing, `Conflict` while any contract references it.
    fn delete_listing(&self, id: &ListingId) -> Result<(), StoreError>;
}

pub trait ContractStore: Send + Sync {
    fn create_contract(
        &self,
        contract: &NewContract,
        at: DateTime<Utc>,
    ) -> Result<Contract, StoreError>;
    fn get_contract(&self, id: &ContractId) -> Result<Option<Contract>, StoreError>;
    fn list_buyer_contracts(
        &self,
        buyer_id: &BuyerId,
        status: Option<ContractStatus>,
    ) -> Result<Vec<Contract>, StoreError>;
    fn list_farmer_contracts(
        &self,
        farmer_id: &FarmerId,
        status: Option<ContractStatus>,
    ) -> Result<Vec<Contract>, StoreError>;
    /// PENDING -> ACCEPTED plus the conditional inventory decrement as one unit.
    ///
    /// Fails with `StaleStatus` if the contract is no longer PENDING and with
    /// `InsufficientInventory` if the listing cannot cover the quantity; in
    /// both cases nothing is written.
    fn accept_contract(&self, id: &ContractId, at: DateTime<Utc>)
        -> Result<Contract, StoreError>;
    /// Compare-and-set of the status column; `StaleStatus` when `from` no longer holds.
    fn update_contract_status(
        &self,
        id: &ContractId,
        from: ContractStatus,
        to: ContractStatus,
        at: DateTime<Utc>,
    ) -> Result<Contract, StoreError>;
}

/// Everything the lifecycle manager needs from persistence.
pub trait MarketplaceStore: AccountStore + ListingStore + ContractStore {}

impl<T> MarketplaceStore for T where T: AccountStore + ListingStore + ContractStore {}
