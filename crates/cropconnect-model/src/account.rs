// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{BuyerId, FarmerId, UserId};
use crate::validation::{require_text, ValidationError};

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 32;
const NAME_MAX_LEN: usize = 128;
const LOCATION_MAX_LEN: usize = 256;
const CROP_TYPE_MAX_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Farmer,
    Buyer,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Farmer => "FARMER",
            Self::Buyer => "BUYER",
        }
    }

    /// Case-insensitive parse of `FARMER` / `BUYER`.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "FARMER" => Ok(Self::Farmer),
            "BUYER" => Ok(Self::Buyer),
            other => Err(ValidationError(format!(
                "unknown role `{other}`, expected FARMER or BUYER"
            ))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// The authenticated caller of a core operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    #[must_use]
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub role: Role,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmerProfile {
    pub id: FarmerId,
    pub user_id: UserId,
    pub experience_years: Option<u32>,
    pub farm_size: Option<f64>,
    pub crop_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerProfile {
    pub id: BuyerId,
    pub user_id: UserId,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FarmerDetails {
    #[serde(default)]
    pub experience_years: Option<u32>,
    #[serde(default)]
    pub farm_size: Option<f64>,
    #[serde(default)]
    pub crop_types: Vec<String>,
}

impl FarmerDetails {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(size) = self.farm_size {
            if !size.is_finite() || size < 0.0 {
                return Err(ValidationError::new(
                    "farm_size must be a finite non-negative number",
                ));
            }
        }
        for crop in &self.crop_types {
            require_text("crop_types entry", crop, CROP_TYPE_MAX_LEN)?;
        }
        Ok(())
    }
}

/// Registration input; the password never enters the model.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub role: Role,
    pub location: String,
    pub farmer_details: Option<FarmerDetails>,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name, NAME_MAX_LEN)?;
        require_text("location", &self.location, LOCATION_MAX_LEN)?;
        validate_username(&self.username)?;
        if self.role == Role::Buyer && self.farmer_details.is_some() {
            return Err(ValidationError::new(
                "farmer details are only accepted for FARMER accounts",
            ));
        }
        if let Some(details) = &self.farmer_details {
            details.validate()?;
        }
        Ok(())
    }
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(ValidationError(format!(
            "username must be {USERNAME_MIN_LEN}..={USERNAME_MAX_LEN} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(ValidationError::new(
            "username must contain only [A-Za-z0-9_.-]",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(role: Role) -> NewUser {
        NewUser {
            name: "Asha".to_string(),
            username: "asha_farms".to_string(),
            role,
            location: "Nakuru".to_string(),
            farmer_details: None,
        }
    }

    #[test]
    fn role_parse_is_case_insensitive() {
        assert_eq!(Role::parse("farmer").expect("farmer"), Role::Farmer);
        assert_eq!(Role::parse(" Buyer ").expect("buyer"), Role::Buyer);
        assert!(Role::parse("admin").is_err());
    }

    #[test]
    fn username_rules_are_enforced() {
        let mut user = new_user(Role::Buyer);
        assert!(user.validate().is_ok());
        user.username = "ab".to_string();
        assert!(user.validate().is_err());
        user.username = "has space".to_string();
        assert!(user.validate().is_err());
    }

    #[test]
    fn buyer_cannot_carry_farmer_details() {
        let mut user = new_user(Role::Buyer);
        user.farmer_details = Some(FarmerDetails::default());
        assert!(user.validate().is_err());
        user.role = Role::Farmer;
        assert!(user.validate().is_ok());
    }

    #[test]
    fn negative_farm_size_is_rejected() {
        let details = FarmerDetails {
            farm_size: Some(-1.0),
            ..FarmerDetails::default()
        };
        assert!(details.validate().is_err());
    }
}
