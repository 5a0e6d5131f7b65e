// SPDX-License-Identifier: Apache-2.0

use cropconnect_model::{Actor, Listing, ListingId, NewListing};
use cropconnect_store::{MarketplaceStore, StoreErrorCode};

use crate::error::LifecycleError;
use crate::manager::ContractLifecycleManager;

impl<S: MarketplaceStore> ContractLifecycleManager<S> {
    pub fn create_listing(
        &self,
        actor: &Actor,
        listing: NewListing,
    ) -> Result<Listing, LifecycleError> {
        let farmer_id = self
            .farmer_id_of(actor)?
            .ok_or_else(|| LifecycleError::ProfileNotFound(format!("farmer {}", actor.user_id)))?;
        listing
            .validate()
            .map_err(|e| LifecycleError::Validation(e.to_string()))?;
        let created = self
            .store
            .create_listing(&farmer_id, &listing, self.clock.now())?;
        tracing::info!(
            listing_id = %created.id,
            farmer_id = %farmer_id,
            quantity = created.quantity_available,
            "listing created"
        );
        Ok(created)
    }

    pub fn list_listings(&self) -> Result<Vec<Listing>, LifecycleError> {
        Ok(self.store.list_listings()?)
    }

    pub fn get_listing(&self, listing_id: &str) -> Result<Listing, LifecycleError> {
        let id = ListingId::parse(listing_id.trim())
            .map_err(|_| LifecycleError::ListingNotFound(listing_id.to_string()))?;
        self.store
            .get_listing(&id)?
            .ok_or_else(|| LifecycleError::ListingNotFound(id.to_string()))
    }

    pub fn list_farmer_listings(&self, actor: &Actor) -> Result<Vec<Listing>, LifecycleError> {
        let farmer_id = self
            .farmer_id_of(actor)?
            .ok_or_else(|| LifecycleError::ProfileNotFound(format!("farmer {}", actor.user_id)))?;
        Ok(self.store.list_farmer_listings(&farmer_id)?)
    }

    /// Owner only; refused while any contract still references the listing.
    pub fn delete_listing(&self, actor: &Actor, listing_id: &str) -> Result<(), LifecycleError> {
        let listing = self.get_listing(listing_id)?;
        if self.farmer_id_of(actor)?.as_ref() != Some(&listing.farmer_id) {
            return Err(LifecycleError::Unauthorized(format!(
                "{} does not own listing {}",
                actor.user_id, listing.id
            )));
        }
        self.store.delete_listing(&listing.id).map_err(|e| match e.code {
            StoreErrorCode::NotFound => LifecycleError::ListingNotFound(listing.id.to_string()),
            _ => e.into(),
        })?;
        tracing::info!(listing_id = %listing.id, "listing deleted");
        Ok(())
    }
}
