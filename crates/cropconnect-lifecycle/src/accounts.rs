// SPDX-License-Identifier: Apache-2.0

use std::sync::OnceLock;

use cropconnect_model::{Actor, FarmerDetails, FarmerProfile, NewUser, Role, User};
use cropconnect_store::MarketplaceStore;

use crate::error::LifecycleError;
use crate::manager::ContractLifecycleManager;
use crate::password::{hash_password, verify_password};

#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub name: String,
    pub username: String,
    pub password: String,
    pub role: String,
    pub location: String,
    pub farmer_details: Option<FarmerDetails>,
}

const LOGIN_FAILED: &str = "invalid username, password or role";

/// Hash checked when the username is unknown so both paths cost the same.
fn decoy_hash(iterations: u32) -> &'static str {
    static DECOY: OnceLock<String> = OnceLock::new();
    DECOY.get_or_init(|| hash_password("decoy-password", iterations).unwrap_or_default())
}

impl<S: MarketplaceStore> ContractLifecycleManager<S> {
    pub fn register(&self, registration: Registration) -> Result<User, LifecycleError> {
        let role =
            Role::parse(&registration.role).map_err(|e| LifecycleError::Validation(e.to_string()))?;
        let farmer_details = match role {
            Role::Farmer => Some(registration.farmer_details.unwrap_or_default()),
            Role::Buyer => registration.farmer_details,
        };
        let user = NewUser {
            name: registration.name,
            username: registration.username.trim().to_string(),
            role,
            location: registration.location,
            farmer_details,
        };
        user.validate()
            .map_err(|e| LifecycleError::Validation(e.to_string()))?;
        let password_hash = hash_password(&registration.password, self.policy.password_iterations)?;
        let created = self
            .store
            .create_user(&user, &password_hash, self.clock.now())?;
        tracing::info!(user_id = %created.id, role = created.role.as_str(), "user registered");
        Ok(created)
    }

    /// Unknown user, wrong password and role mismatch fail identically.
    pub fn login(&self, username: &str, password: &str, role: &str) -> Result<User, LifecycleError> {
        let role = Role::parse(role).map_err(|e| LifecycleError::Validation(e.to_string()))?;
        let Some(credentials) = self.store.find_credentials(username.trim())? else {
            let _ = verify_password(password, decoy_hash(self.policy.password_iterations));
            tracing::info!(reason = "unknown_user", "login rejected");
            return Err(LifecycleError::Unauthenticated(LOGIN_FAILED.to_string()));
        };
        if !verify_password(password, &credentials.password_hash) || credentials.user.role != role
        {
            tracing::info!(user_id = %credentials.user.id, "login rejected");
            return Err(LifecycleError::Unauthenticated(LOGIN_FAILED.to_string()));
        }
        Ok(credentials.user)
    }

    /// Re-checks a session's claims against the account table.
    pub fn current_user(&self, actor: &Actor) -> Result<User, LifecycleError> {
        match self.store.get_user(&actor.user_id)? {
            Some(user) if user.role == actor.role => Ok(user),
            _ => Err(LifecycleError::Unauthenticated(
                "session does not match an existing account".to_string(),
            )),
        }
    }

    /// Operator tooling acts as a named account without a password.
    pub fn actor_for_username(&self, username: &str) -> Result<Actor, LifecycleError> {
        self.store
            .find_credentials(username.trim())?
            .map(|credentials| Actor::new(credentials.user.id, credentials.user.role))
            .ok_or_else(|| {
                LifecycleError::Unauthenticated(format!("no account named `{username}`"))
            })
    }

    pub fn farmer_profile(&self, actor: &Actor) -> Result<FarmerProfile, LifecycleError> {
        if actor.role != Role::Farmer {
            return Err(LifecycleError::Unauthorized(
                "farmer profile is only available to FARMER accounts".to_string(),
            ));
        }
        self.store
            .farmer_profile_for_user(&actor.user_id)?
            .ok_or_else(|| LifecycleError::ProfileNotFound(format!("farmer {}", actor.user_id)))
    }
}
