// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use cropconnect_core::FixedClock;
use cropconnect_lifecycle::{
    ContractLifecycleManager, ContractRequest, LifecyclePolicy, Registration,
};
use cropconnect_model::{Actor, Contract, Listing, Location, NewListing, Role};
use cropconnect_store::SqliteStore;

pub type Manager = ContractLifecycleManager<SqliteStore>;

pub struct World {
    pub manager: Manager,
    pub clock: Arc<FixedClock>,
    pub farmer: Actor,
    pub buyer: Actor,
    pub stranger: Actor,
}

pub fn world() -> World {
    world_with(LifecyclePolicy {
        password_iterations: 8,
        ..LifecyclePolicy::default()
    })
}

pub fn world_with(policy: LifecyclePolicy) -> World {
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0)
            .single()
            .expect("timestamp"),
    ));
    let store = Arc::new(SqliteStore::open_in_memory().expect("store"));
    let manager = ContractLifecycleManager::new(store, clock.clone(), policy);
    let farmer = register(&manager, "farmer_ann", Role::Farmer);
    let buyer = register(&manager, "buyer_bob", Role::Buyer);
    let stranger = register(&manager, "buyer_cy", Role::Buyer);
    World {
        manager,
        clock,
        farmer,
        buyer,
        stranger,
    }
}

pub fn register(manager: &Manager, username: &str, role: Role) -> Actor {
    let user = manager
        .register(Registration {
            name: format!("{username} display"),
            username: username.to_string(),
            password: "s3cret-pass".to_string(),
            role: role.as_str().to_string(),
            location: "Machakos".to_string(),
            farmer_details: None,
        })
        .expect("register");
    Actor::new(user.id, user.role)
}

pub fn listing(world: &World, quantity: u64) -> Listing {
    world
        .manager
        .create_listing(
            &world.farmer,
            NewListing {
                name: "Sorghum".to_string(),
                description: "Red sorghum, sun dried".to_string(),
                price: 0.9,
                quantity,
                location: Location {
                    address: "Kitui".to_string(),
                    latitude: Some(-1.37),
                    longitude: Some(38.01),
                },
                image_url: None,
            },
        )
        .expect("listing")
}

pub fn request(listing: &Listing, quantity: i64) -> ContractRequest {
    ContractRequest {
        listing_id: listing.id.to_string(),
        quantity_requested: quantity,
        delivery_date: "2026-11-01".to_string(),
        notes: "deliver to the co-op gate".to_string(),
    }
}

pub fn contract(world: &World, listing: &Listing, quantity: i64) -> Contract {
    world
        .manager
        .create_contract(&world.buyer, request(listing, quantity))
        .expect("contract")
}

pub fn available(world: &World, listing: &Listing) -> u64 {
    world
        .manager
        .get_listing(listing.id.as_str())
        .expect("listing")
        .quantity_available
}
