// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{BuyerId, ContractId, FarmerId, ListingId};
use crate::validation::ValidationError;

pub const NOTES_MAX_LEN: usize = 2048;

/// Closed set of contract states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractStatus {
    Pending,
    Accepted,
    InTransit,
    Delivered,
    Cancelled,
}

/// Every permitted `(from, to)` edge. Pairs not listed here are illegal.
pub const CONTRACT_TRANSITIONS: [(ContractStatus, ContractStatus); 5] = [
    (ContractStatus::Pending, ContractStatus::Accepted),
    (ContractStatus::Pending, ContractStatus::Cancelled),
    (ContractStatus::Accepted, ContractStatus::InTransit),
    (ContractStatus::Accepted, ContractStatus::Cancelled),
    (ContractStatus::InTransit, ContractStatus::Delivered),
];

impl ContractStatus {
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Accepted,
        Self::InTransit,
        Self::Delivered,
        Self::Cancelled,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::InTransit => "IN_TRANSIT",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Accepts any letter case and `-` or space in place of `_`.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ValidationError(format!("unknown contract status `{}`", raw.trim())))
    }

    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        CONTRACT_TRANSITIONS.contains(&(self, target))
    }

    #[must_use]
    pub fn successors(self) -> Vec<Self> {
        CONTRACT_TRANSITIONS
            .iter()
            .filter(|(from, _)| *from == self)
            .map(|(_, to)| *to)
            .collect()
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A purchase agreement between one buyer and the farmer owning one listing.
///
/// `farmer_id` is the listing owner at read time; stores fill it in through
/// the listing so callers never traverse relations themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub listing_id: ListingId,
    pub buyer_id: BuyerId,
    pub farmer_id: FarmerId,
    pub quantity_requested: u64,
    pub delivery_date: NaiveDate,
    pub status: ContractStatus,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub status_changed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContract {
    pub listing_id: ListingId,
    pub buyer_id: BuyerId,
    pub quantity_requested: u64,
    pub delivery_date: NaiveDate,
    pub notes: String,
}

impl NewContract {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.quantity_requested == 0 {
            return Err(ValidationError::new(
                "quantity_requested must be a positive integer",
            ));
        }
        if self.notes.chars().count() > NOTES_MAX_LEN {
            return Err(ValidationError(format!(
                "notes exceed max length {NOTES_MAX_LEN}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_case_and_separators() {
        assert_eq!(
            ContractStatus::parse("in-transit").expect("in-transit"),
            ContractStatus::InTransit
        );
        assert_eq!(
            ContractStatus::parse("In Transit").expect("in transit"),
            ContractStatus::InTransit
        );
        assert_eq!(
            ContractStatus::parse("accepted").expect("accepted"),
            ContractStatus::Accepted
        );
        assert!(ContractStatus::parse("SHIPPED").is_err());
        assert!(ContractStatus::parse("").is_err());
    }

    #[test]
    fn terminal_states_have_no_successors() {
        for status in ContractStatus::ALL {
            assert_eq!(status.is_terminal(), status.successors().is_empty());
        }
    }

    #[test]
    fn serde_uses_wire_literals() {
        let json = serde_json::to_string(&ContractStatus::InTransit).expect("serialize");
        assert_eq!(json, "\"IN_TRANSIT\"");
    }

    #[test]
    fn zero_quantity_contract_is_invalid() {
        let contract = NewContract {
            listing_id: ListingId::generate(),
            buyer_id: BuyerId::generate(),
            quantity_requested: 0,
            delivery_date: NaiveDate::from_ymd_opt(2026, 11, 1).expect("date"),
            notes: String::new(),
        };
        assert!(contract.validate().is_err());
    }
}
