// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use chrono::NaiveDate;
use cropconnect_core::ClockPort;
use cropconnect_model::{
    Actor, BuyerId, Contract, ContractId, ContractStatus, FarmerId, ListingId, NewContract, Role,
};
use cropconnect_store::{MarketplaceStore, StoreError, StoreErrorCode};

use crate::error::LifecycleError;
use crate::policy::LifecyclePolicy;

/// Raw contract request as it arrives from a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractRequest {
    pub listing_id: String,
    pub quantity_requested: i64,
    pub delivery_date: String,
    pub notes: String,
}

pub struct ContractLifecycleManager<S> {
    pub(crate) store: Arc<S>,
    pub(crate) clock: Arc<dyn ClockPort>,
    pub(crate) policy: LifecyclePolicy,
}

impl<S> Clone for ContractLifecycleManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            policy: self.policy,
        }
    }
}

impl<S: MarketplaceStore> ContractLifecycleManager<S> {
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<dyn ClockPort>, policy: LifecyclePolicy) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn policy(&self) -> LifecyclePolicy {
        self.policy
    }

    pub(crate) fn farmer_id_of(&self, actor: &Actor) -> Result<Option<FarmerId>, LifecycleError> {
        if actor.role != Role::Farmer {
            return Ok(None);
        }
        Ok(self
            .store
            .farmer_profile_for_user(&actor.user_id)?
            .map(|profile| profile.id))
    }

    pub(crate) fn buyer_id_of(&self, actor: &Actor) -> Result<Option<BuyerId>, LifecycleError> {
        if actor.role != Role::Buyer {
            return Ok(None);
        }
        Ok(self
            .store
            .buyer_profile_for_user(&actor.user_id)?
            .map(|profile| profile.id))
    }

    fn load_contract(&self, id: &ContractId) -> Result<Contract, LifecycleError> {
        self.store
            .get_contract(id)?
            .ok_or_else(|| LifecycleError::ContractNotFound(id.to_string()))
    }

    pub fn create_contract(
        &self,
        actor: &Actor,
        request: ContractRequest,
    ) -> Result<Contract, LifecycleError> {
        let buyer_id = self
            .buyer_id_of(actor)?
            .ok_or_else(|| LifecycleError::ProfileNotFound(format!("buyer {}", actor.user_id)))?;
        let listing_id = ListingId::parse(request.listing_id.trim())
            .map_err(|_| LifecycleError::ListingNotFound(request.listing_id.clone()))?;
        let listing = self
            .store
            .get_listing(&listing_id)?
            .ok_or_else(|| LifecycleError::ListingNotFound(listing_id.to_string()))?;

        let quantity = u64::try_from(request.quantity_requested)
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| {
                LifecycleError::Validation(
                    "quantity_requested must be a positive integer".to_string(),
                )
            })?;
        if !listing.can_supply(quantity) {
            return Err(LifecycleError::InsufficientQuantity {
                requested: quantity,
                available: listing.quantity_available,
            });
        }

        let now = self.clock.now();
        let delivery_date = NaiveDate::parse_from_str(request.delivery_date.trim(), "%Y-%m-%d")
            .map_err(|_| {
                LifecycleError::Validation(format!(
                    "delivery_date `{}` is not a YYYY-MM-DD date",
                    request.delivery_date
                ))
            })?;
        if !self.policy.allow_past_delivery && delivery_date < now.date_naive() {
            return Err(LifecycleError::Validation(format!(
                "delivery_date {delivery_date} is before {}",
                now.date_naive()
            )));
        }

        let draft = NewContract {
            listing_id,
            buyer_id,
            quantity_requested: quantity,
            delivery_date,
            notes: request.notes.trim().to_string(),
        };
        draft
            .validate()
            .map_err(|e| LifecycleError::Validation(e.to_string()))?;

        let contract = self.store.create_contract(&draft, now).map_err(|e| match e.code {
            StoreErrorCode::NotFound => {
                LifecycleError::ListingNotFound(draft.listing_id.to_string())
            }
            _ => e.into(),
        })?;
        tracing::info!(
            contract_id = %contract.id,
            listing_id = %contract.listing_id,
            buyer_id = %contract.buyer_id,
            quantity = contract.quantity_requested,
            status = contract.status.as_str(),
            "contract created"
        );
        Ok(contract)
    }

    /// Boundary entry point: normalizes the raw status literal and id first.
    pub fn transition_status(
        &self,
        actor: &Actor,
        contract_id: &str,
        target: &str,
    ) -> Result<Contract, LifecycleError> {
        let target = ContractStatus::parse(target)
            .map_err(|_| LifecycleError::InvalidStatus(target.trim().to_string()))?;
        let id = ContractId::parse(contract_id.trim())
            .map_err(|_| LifecycleError::ContractNotFound(contract_id.to_string()))?;
        self.transition_to(actor, &id, target)
    }

    pub fn transition_to(
        &self,
        actor: &Actor,
        id: &ContractId,
        target: ContractStatus,
    ) -> Result<Contract, LifecycleError> {
        let current = self.load_contract(id)?;
        self.authorize_transition(actor, &current, target)?;
        let from = current.status;
        if !from.can_transition_to(target) {
            return Err(LifecycleError::IllegalTransition { from, to: target });
        }

        let now = self.clock.now();
        let result = if (from, target) == (ContractStatus::Pending, ContractStatus::Accepted) {
            self.store.accept_contract(id, now)
        } else {
            self.store.update_contract_status(id, from, target, now)
        };
        let updated = result.map_err(|e| self.transition_failure(e, &current, target))?;

        tracing::info!(
            contract_id = %updated.id,
            actor = %actor.user_id,
            from = from.as_str(),
            status = updated.status.as_str(),
            "contract status changed"
        );
        Ok(updated)
    }

    fn authorize_transition(
        &self,
        actor: &Actor,
        contract: &Contract,
        target: ContractStatus,
    ) -> Result<(), LifecycleError> {
        if self.farmer_id_of(actor)?.as_ref() == Some(&contract.farmer_id) {
            return Ok(());
        }
        let is_buyer = self.buyer_id_of(actor)?.as_ref() == Some(&contract.buyer_id);
        if is_buyer
            && self.policy.buyer_may_cancel_pending
            && contract.status == ContractStatus::Pending
            && target == ContractStatus::Cancelled
        {
            return Ok(());
        }
        tracing::warn!(
            contract_id = %contract.id,
            actor = %actor.user_id,
            target = target.as_str(),
            "contract transition refused"
        );
        Err(LifecycleError::Unauthorized(format!(
            "{} may not move contract {} to {target}",
            actor.user_id, contract.id
        )))
    }

    fn transition_failure(
        &self,
        err: StoreError,
        current: &Contract,
        target: ContractStatus,
    ) -> LifecycleError {
        match err.code {
            StoreErrorCode::NotFound => LifecycleError::ContractNotFound(current.id.to_string()),
            StoreErrorCode::StaleStatus => {
                let from = self
                    .store
                    .get_contract(&current.id)
                    .ok()
                    .flatten()
                    .map_or(current.status, |c| c.status);
                LifecycleError::IllegalTransition { from, to: target }
            }
            StoreErrorCode::InsufficientInventory => {
                let available = self
                    .store
                    .get_listing(&current.listing_id)
                    .ok()
                    .flatten()
                    .map_or(0, |l| l.quantity_available);
                tracing::warn!(
                    contract_id = %current.id,
                    listing_id = %current.listing_id,
                    requested = current.quantity_requested,
                    available,
                    "acceptance rejected for insufficient inventory"
                );
                LifecycleError::InsufficientQuantity {
                    requested: current.quantity_requested,
                    available,
                }
            }
            _ => err.into(),
        }
    }

    /// Visible to the contract's buyer and to the farmer owning its listing.
    pub fn get_contract(&self, actor: &Actor, contract_id: &str) -> Result<Contract, LifecycleError> {
        let id = ContractId::parse(contract_id.trim())
            .map_err(|_| LifecycleError::ContractNotFound(contract_id.to_string()))?;
        let contract = self.load_contract(&id)?;
        let visible = self.farmer_id_of(actor)?.as_ref() == Some(&contract.farmer_id)
            || self.buyer_id_of(actor)?.as_ref() == Some(&contract.buyer_id);
        if !visible {
            return Err(LifecycleError::Unauthorized(format!(
                "{} may not view contract {id}",
                actor.user_id
            )));
        }
        Ok(contract)
    }

    /// Contracts where the actor is buyer or owning farmer, newest first.
    pub fn list_contracts(
        &self,
        actor: &Actor,
        status: Option<&str>,
    ) -> Result<Vec<Contract>, LifecycleError> {
        let status = status
            .map(|raw| {
                ContractStatus::parse(raw)
                    .map_err(|_| LifecycleError::InvalidStatus(raw.trim().to_string()))
            })
            .transpose()?;
        match actor.role {
            Role::Farmer => {
                let farmer_id = self.farmer_id_of(actor)?.ok_or_else(|| {
                    LifecycleError::ProfileNotFound(format!("farmer {}", actor.user_id))
                })?;
                Ok(self.store.list_farmer_contracts(&farmer_id, status)?)
            }
            Role::Buyer => {
                let buyer_id = self.buyer_id_of(actor)?.ok_or_else(|| {
                    LifecycleError::ProfileNotFound(format!("buyer {}", actor.user_id))
                })?;
                Ok(self.store.list_buyer_contracts(&buyer_id, status)?)
            }
        }
    }
}
