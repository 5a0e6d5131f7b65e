// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use cropconnect_model::{
    BuyerId, Contract, ContractId, ContractStatus, FarmerId, FarmerProfile, Listing, ListingId,
    Location, Role, User, UserId,
};
use rusqlite::Row;

use crate::error::{StoreError, StoreErrorCode};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) const CONTRACT_COLUMNS: &str = "c.id, c.listing_id, c.buyer_id, l.farmer_id, \
     c.quantity_requested, c.delivery_date, c.status, c.notes, c.created_at, c.status_changed_at \
     FROM contracts c JOIN listings l ON l.id = c.listing_id";

pub(crate) const LISTING_COLUMNS: &str = "id, farmer_id, name, description, price, \
     quantity_available, address, latitude, longitude, image_url, created_at FROM listings";

pub(crate) const USER_COLUMNS: &str =
    "id, name, username, role, location, created_at, password_hash FROM users";

/// Fixed-width UTC timestamps so lexical order matches time order.
pub(crate) fn encode_ts(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_ts(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StoreError::internal(format!("corrupt timestamp `{raw}`: {e}")))
}

pub(crate) fn encode_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn decode_date(raw: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| StoreError::internal(format!("corrupt date `{raw}`: {e}")))
}

pub(crate) fn to_sql_quantity(value: u64) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| {
        StoreError::new(
            StoreErrorCode::Validation,
            format!("quantity {value} exceeds storable range"),
        )
    })
}

fn from_sql_quantity(value: i64) -> Result<u64, StoreError> {
    u64::try_from(value)
        .map_err(|_| StoreError::internal(format!("negative quantity {value} in store")))
}

fn corrupt<E: std::fmt::Display>(column: &'static str) -> impl FnOnce(E) -> StoreError {
    move |e| StoreError::internal(format!("corrupt {column}: {e}"))
}

pub(crate) struct ContractRow {
    id: String,
    listing_id: String,
    buyer_id: String,
    farmer_id: String,
    quantity_requested: i64,
    delivery_date: String,
    status: String,
    notes: String,
    created_at: String,
    status_changed_at: String,
}

impl ContractRow {
    pub(crate) fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            listing_id: row.get(1)?,
            buyer_id: row.get(2)?,
            farmer_id: row.get(3)?,
            quantity_requested: row.get(4)?,
            delivery_date: row.get(5)?,
            status: row.get(6)?,
            notes: row.get(7)?,
            created_at: row.get(8)?,
            status_changed_at: row.get(9)?,
        })
    }

    pub(crate) fn into_contract(self) -> Result<Contract, StoreError> {
        Ok(Contract {
            id: ContractId::parse(self.id).map_err(corrupt("contract id"))?,
            listing_id: ListingId::parse(self.listing_id).map_err(corrupt("listing id"))?,
            buyer_id: BuyerId::parse(self.buyer_id).map_err(corrupt("buyer id"))?,
            farmer_id: FarmerId::parse(self.farmer_id).map_err(corrupt("farmer id"))?,
            quantity_requested: from_sql_quantity(self.quantity_requested)?,
            delivery_date: decode_date(&self.delivery_date)?,
            status: ContractStatus::parse(&self.status).map_err(corrupt("status"))?,
            notes: self.notes,
            created_at: decode_ts(&self.created_at)?,
            status_changed_at: decode_ts(&self.status_changed_at)?,
        })
    }
}

pub(crate) struct ListingRow {
    id: String,
    farmer_id: String,
    name: String,
    description: String,
    price: f64,
    quantity_available: i64,
    address: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    image_url: Option<String>,
    created_at: String,
}

impl ListingRow {
    pub(crate) fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            farmer_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            price: row.get(4)?,
            quantity_available: row.get(5)?,
            address: row.get(6)?,
            latitude: row.get(7)?,
            longitude: row.get(8)?,
            image_url: row.get(9)?,
            created_at: row.get(10)?,
        })
    }

    pub(crate) fn into_listing(self) -> Result<Listing, StoreError> {
        Ok(Listing {
            id: ListingId::parse(self.id).map_err(corrupt("listing id"))?,
            farmer_id: FarmerId::parse(self.farmer_id).map_err(corrupt("farmer id"))?,
            name: self.name,
            description: self.description,
            price: self.price,
            quantity_available: from_sql_quantity(self.quantity_available)?,
            location: Location {
                address: self.address,
                latitude: self.latitude,
                longitude: self.longitude,
            },
            image_url: self.image_url,
            created_at: decode_ts(&self.created_at)?,
        })
    }
}

pub(crate) struct UserRow {
    id: String,
    name: String,
    username: String,
    role: String,
    location: String,
    created_at: String,
    pub(crate) password_hash: String,
}

impl UserRow {
    pub(crate) fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            username: row.get(2)?,
            role: row.get(3)?,
            location: row.get(4)?,
            created_at: row.get(5)?,
            password_hash: row.get(6)?,
        })
    }

    pub(crate) fn into_user(self) -> Result<User, StoreError> {
        Ok(User {
            id: UserId::parse(self.id).map_err(corrupt("user id"))?,
            name: self.name,
            username: self.username,
            role: Role::parse(&self.role).map_err(corrupt("role"))?,
            location: self.location,
            created_at: decode_ts(&self.created_at)?,
        })
    }
}

pub(crate) struct FarmerRow {
    id: String,
    user_id: String,
    experience_years: Option<i64>,
    farm_size: Option<f64>,
    crop_types: String,
}

impl FarmerRow {
    pub(crate) fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            experience_years: row.get(2)?,
            farm_size: row.get(3)?,
            crop_types: row.get(4)?,
        })
    }

    pub(crate) fn into_profile(self) -> Result<FarmerProfile, StoreError> {
        let experience_years = self
            .experience_years
            .map(u32::try_from)
            .transpose()
            .map_err(corrupt("experience_years"))?;
        Ok(FarmerProfile {
            id: FarmerId::parse(self.id).map_err(corrupt("farmer id"))?,
            user_id: UserId::parse(self.user_id).map_err(corrupt("user id"))?,
            experience_years,
            farm_size: self.farm_size,
            crop_types: serde_json::from_str(&self.crop_types).map_err(corrupt("crop_types"))?,
        })
    }
}
