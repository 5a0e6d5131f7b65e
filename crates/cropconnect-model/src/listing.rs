// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{FarmerId, ListingId};
use crate::validation::{require_text, ValidationError};

pub const LISTING_NAME_MAX_LEN: usize = 128;
const DESCRIPTION_MAX_LEN: usize = 4096;
const ADDRESS_MAX_LEN: usize = 256;
const IMAGE_URL_MAX_LEN: usize = 2048;

/// Location text plus optional coordinates. The core never interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Location {
    pub address: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Location {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("location.address", &self.address, ADDRESS_MAX_LEN)?;
        if let Some(lat) = self.latitude {
            if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                return Err(ValidationError::new("latitude must be within [-90, 90]"));
            }
        }
        if let Some(lon) = self.longitude {
            if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
                return Err(ValidationError::new(
                    "longitude must be within [-180, 180]",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub farmer_id: FarmerId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity_available: u64,
    pub location: Location,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Listing {
    #[must_use]
    pub fn can_supply(&self, quantity: u64) -> bool {
        quantity <= self.quantity_available
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: u64,
    pub location: Location,
    pub image_url: Option<String>,
}

impl NewListing {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name, LISTING_NAME_MAX_LEN)?;
        require_text("description", &self.description, DESCRIPTION_MAX_LEN)?;
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(ValidationError::new("price must be a positive finite number"));
        }
        self.location.validate()?;
        if let Some(url) = &self.image_url {
            require_text("image_url", url, IMAGE_URL_MAX_LEN)?;
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ValidationError::new("image_url must be an http(s) URL"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tomatoes() -> NewListing {
        NewListing {
            name: "Tomatoes".to_string(),
            description: "Roma, vine ripened".to_string(),
            price: 2.5,
            quantity: 100,
            location: Location {
                address: "Plot 7, Naivasha".to_string(),
                latitude: Some(-0.71),
                longitude: Some(36.43),
            },
            image_url: None,
        }
    }

    #[test]
    fn valid_listing_passes() {
        assert!(tomatoes().validate().is_ok());
    }

    #[test]
    fn price_must_be_positive_and_finite() {
        for price in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let listing = NewListing { price, ..tomatoes() };
            assert!(listing.validate().is_err(), "price {price} accepted");
        }
    }

    #[test]
    fn blank_fields_and_bad_coordinates_are_rejected() {
        assert!(NewListing { name: "  ".to_string(), ..tomatoes() }.validate().is_err());
        let mut listing = tomatoes();
        listing.location.latitude = Some(91.0);
        assert!(listing.validate().is_err());
        let mut listing = tomatoes();
        listing.image_url = Some("ftp://img".to_string());
        assert!(listing.validate().is_err());
    }

    #[test]
    fn zero_quantity_is_a_valid_listing() {
        let listing = NewListing { quantity: 0, ..tomatoes() };
        assert!(listing.validate().is_ok());
    }
}
