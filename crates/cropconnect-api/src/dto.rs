// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, NaiveDate, Utc};
use cropconnect_lifecycle::{ContractRequest, LifecycleError, Registration};
use cropconnect_model::{
    Contract, ContractStatus, FarmerDetails, FarmerProfile, Listing, Location, NewListing, Role,
    User,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiResponseEnvelope<T> {
    pub data: T,
}

impl<T> ApiResponseEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequestDto {
    pub name: String,
    pub username: String,
    pub password: String,
    pub role: String,
    pub location: String,
    #[serde(default)]
    pub farmer_details: Option<FarmerDetails>,
}

impl From<RegisterRequestDto> for Registration {
    fn from(dto: RegisterRequestDto) -> Self {
        Self {
            name: dto.name,
            username: dto.username,
            password: dto.password,
            role: dto.role,
            location: dto.location,
            farmer_details: dto.farmer_details,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequestDto {
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserDto {
    pub id: String,
    pub name: String,
    pub username: String,
    pub role: Role,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id.into(),
            name: user.name,
            username: user.username,
            role: user.role,
            location: user.location,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionDto {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserDto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FarmerProfileDto {
    pub id: String,
    pub user_id: String,
    pub experience_years: Option<u32>,
    pub farm_size: Option<f64>,
    pub crop_types: Vec<String>,
}

impl From<FarmerProfile> for FarmerProfileDto {
    fn from(profile: FarmerProfile) -> Self {
        Self {
            id: profile.id.into(),
            user_id: profile.user_id.into(),
            experience_years: profile.experience_years,
            farm_size: profile.farm_size,
            crop_types: profile.crop_types,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateListingRequestDto {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: i64,
    pub location: Location,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl TryFrom<CreateListingRequestDto> for NewListing {
    type Error = LifecycleError;

    fn try_from(dto: CreateListingRequestDto) -> Result<Self, Self::Error> {
        let quantity = u64::try_from(dto.quantity).map_err(|_| {
            LifecycleError::Validation("quantity must be a non-negative integer".to_string())
        })?;
        Ok(Self {
            name: dto.name,
            description: dto.description,
            price: dto.price,
            quantity,
            location: dto.location,
            image_url: dto.image_url.filter(|url| !url.trim().is_empty()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListingDto {
    pub id: String,
    pub farmer_id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity_available: u64,
    pub location: Location,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Listing> for ListingDto {
    fn from(listing: Listing) -> Self {
        Self {
            id: listing.id.into(),
            farmer_id: listing.farmer_id.into(),
            name: listing.name,
            description: listing.description,
            price: listing.price,
            quantity_available: listing.quantity_available,
            location: listing.location,
            image_url: listing.image_url,
            created_at: listing.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateContractRequestDto {
    pub listing_id: String,
    pub quantity_requested: i64,
    pub delivery_date: String,
    #[serde(default)]
    pub notes: String,
}

impl From<CreateContractRequestDto> for ContractRequest {
    fn from(dto: CreateContractRequestDto) -> Self {
        Self {
            listing_id: dto.listing_id,
            quantity_requested: dto.quantity_requested,
            delivery_date: dto.delivery_date,
            notes: dto.notes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransitionRequestDto {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractDto {
    pub id: String,
    pub listing_id: String,
    pub buyer_id: String,
    pub farmer_id: String,
    pub quantity_requested: u64,
    pub delivery_date: NaiveDate,
    pub status: ContractStatus,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub status_changed_at: DateTime<Utc>,
    /// Statuses reachable from here; empty once terminal.
    pub next_statuses: Vec<ContractStatus>,
}

impl From<Contract> for ContractDto {
    fn from(contract: Contract) -> Self {
        Self {
            next_statuses: contract.status.successors(),
            id: contract.id.into(),
            listing_id: contract.listing_id.into(),
            buyer_id: contract.buyer_id.into(),
            farmer_id: contract.farmer_id.into(),
            quantity_requested: contract.quantity_requested,
            delivery_date: contract.delivery_date,
            status: contract.status,
            notes: contract.notes,
            created_at: contract.created_at,
            status_changed_at: contract.status_changed_at,
        }
    }
}
