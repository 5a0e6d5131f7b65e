// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use cropconnect_model::{
    Contract, ContractStatus, FarmerDetails, Listing, Location, NewContract, NewListing, NewUser,
    Role, User,
};
use cropconnect_store::{
    AccountStore, ContractStore, ListingStore, SqliteStore, StoreErrorCode, SCHEMA_VERSION,
};
use tempfile::tempdir;

fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 1, 9, minute, 0)
        .single()
        .expect("timestamp")
}

fn register(store: &SqliteStore, username: &str, role: Role) -> User {
    let user = NewUser {
        name: format!("{username} name"),
        username: username.to_string(),
        role,
        location: "Kisumu".to_string(),
        farmer_details: (role == Role::Farmer).then(|| FarmerDetails {
            experience_years: Some(12),
            farm_size: Some(4.5),
            crop_types: vec!["maize".to_string(), "beans".to_string()],
        }),
    };
    store
        .create_user(&user, "hash", at(0))
        .expect("create user")
}

struct Fixture {
    store: SqliteStore,
    listing: Listing,
    buyer: cropconnect_model::BuyerProfile,
}

fn fixture(store: SqliteStore, quantity: u64) -> Fixture {
    let farmer = register(&store, "farmer_one", Role::Farmer);
    let buyer = register(&store, "buyer_one", Role::Buyer);
    let farmer_profile = store
        .farmer_profile_for_user(&farmer.id)
        .expect("lookup")
        .expect("farmer profile");
    let buyer = store
        .buyer_profile_for_user(&buyer.id)
        .expect("lookup")
        .expect("buyer profile");
    let listing = store
        .create_listing(
            &farmer_profile.id,
            &NewListing {
                name: "Maize".to_string(),
                description: "Dry white maize".to_string(),
                price: 0.4,
                quantity,
                location: Location {
                    address: "Kitale".to_string(),
                    latitude: None,
                    longitude: None,
                },
                image_url: None,
            },
            at(1),
        )
        .expect("create listing");
    Fixture {
        store,
        listing,
        buyer,
    }
}

fn contract(fx: &Fixture, quantity: u64, minute: u32) -> Contract {
    fx.store
        .create_contract(
            &NewContract {
                listing_id: fx.listing.id.clone(),
                buyer_id: fx.buyer.id.clone(),
                quantity_requested: quantity,
                delivery_date: NaiveDate::from_ymd_opt(2026, 12, 1).expect("date"),
                notes: String::new(),
            },
            at(minute),
        )
        .expect("create contract")
}

fn available(fx: &Fixture) -> u64 {
    fx.store
        .get_listing(&fx.listing.id)
        .expect("get listing")
        .expect("listing exists")
        .quantity_available
}

#[test]
fn accept_decrements_inventory_and_stamps_status_change() {
    let fx = fixture(SqliteStore::open_in_memory().expect("store"), 100);
    let pending = contract(&fx, 40, 2);
    assert_eq!(pending.status, ContractStatus::Pending);
    assert_eq!(pending.farmer_id, fx.listing.farmer_id);
    assert_eq!(available(&fx), 100);

    let accepted = fx
        .store
        .accept_contract(&pending.id, at(3))
        .expect("accept");
    assert_eq!(accepted.status, ContractStatus::Accepted);
    assert_eq!(accepted.status_changed_at, at(3));
    assert_eq!(accepted.created_at, pending.created_at);
    assert_eq!(available(&fx), 60);
}

#[test]
fn insufficient_inventory_rolls_back_the_status_change() {
    let fx = fixture(SqliteStore::open_in_memory().expect("store"), 100);
    let first = contract(&fx, 60, 2);
    let second = contract(&fx, 60, 3);
    fx.store.accept_contract(&first.id, at(4)).expect("first accept");

    let err = fx
        .store
        .accept_contract(&second.id, at(5))
        .expect_err("second accept must fail");
    assert_eq!(err.code, StoreErrorCode::InsufficientInventory);
    assert_eq!(available(&fx), 40);
    let reread = fx
        .store
        .get_contract(&second.id)
        .expect("get")
        .expect("exists");
    assert_eq!(reread.status, ContractStatus::Pending);
    assert_eq!(reread.status_changed_at, second.status_changed_at);
}

#[test]
fn concurrent_acceptances_across_connections_never_overbook() {
    let root = tempdir().expect("tempdir");
    let path = root.path().join("shared.sqlite");
    let fx = fixture(SqliteStore::open(&path).expect("open"), 100);
    let contenders: Vec<Contract> = (0..8).map(|i| contract(&fx, 60, 2 + i)).collect();
    let handles: Vec<SqliteStore> = contenders
        .iter()
        .map(|_| SqliteStore::open(&path).expect("extra connection"))
        .collect();

    let outcomes: Vec<Result<Contract, StoreErrorCode>> = std::thread::scope(|scope| {
        let workers: Vec<_> = contenders
            .iter()
            .zip(&handles)
            .map(|(pending, store)| {
                scope.spawn(move || {
                    store
                        .accept_contract(&pending.id, at(30))
                        .map_err(|err| err.code)
                })
            })
            .collect();
        workers
            .into_iter()
            .map(|worker| worker.join().expect("worker thread"))
            .collect()
    });

    let accepted: Vec<&Contract> = outcomes.iter().filter_map(|o| o.as_ref().ok()).collect();
    assert_eq!(accepted.len(), 1, "{outcomes:?}");
    assert!(outcomes
        .iter()
        .filter_map(|o| o.as_ref().err())
        .all(|code| *code == StoreErrorCode::InsufficientInventory));
    assert_eq!(available(&fx), 40);

    let still_pending = contenders
        .iter()
        .filter(|c| {
            fx.store
                .get_contract(&c.id)
                .expect("get")
                .is_some_and(|c| c.status == ContractStatus::Pending)
        })
        .count();
    assert_eq!(still_pending, 7);
}

#[test]
fn compare_and_set_rejects_stale_status() {
    let fx = fixture(SqliteStore::open_in_memory().expect("store"), 10);
    let c = contract(&fx, 5, 2);
    fx.store
        .update_contract_status(&c.id, ContractStatus::Pending, ContractStatus::Cancelled, at(3))
        .expect("cancel");
    let err = fx
        .store
        .update_contract_status(&c.id, ContractStatus::Pending, ContractStatus::Accepted, at(4))
        .expect_err("stale");
    assert_eq!(err.code, StoreErrorCode::StaleStatus);
    let err = fx.store.accept_contract(&c.id, at(5)).expect_err("stale");
    assert_eq!(err.code, StoreErrorCode::StaleStatus);
    assert_eq!(available(&fx), 10);
}

#[test]
fn listing_delete_is_guarded_by_contract_references() {
    let fx = fixture(SqliteStore::open_in_memory().expect("store"), 10);
    contract(&fx, 5, 2);
    let err = fx
        .store
        .delete_listing(&fx.listing.id)
        .expect_err("referenced listing");
    assert_eq!(err.code, StoreErrorCode::Conflict);

    let farmer = fx.listing.farmer_id.clone();
    let spare = fx
        .store
        .create_listing(
            &farmer,
            &NewListing {
                name: "Beans".to_string(),
                description: "Rosecoco".to_string(),
                price: 1.2,
                quantity: 3,
                location: fx.listing.location.clone(),
                image_url: Some("https://img.example/beans.png".to_string()),
            },
            at(6),
        )
        .expect("spare listing");
    fx.store.delete_listing(&spare.id).expect("delete");
    let err = fx.store.delete_listing(&spare.id).expect_err("gone");
    assert_eq!(err.code, StoreErrorCode::NotFound);
}

#[test]
fn listings_and_contracts_are_listed_newest_first() {
    let fx = fixture(SqliteStore::open_in_memory().expect("store"), 100);
    let older = contract(&fx, 1, 2);
    let newer = contract(&fx, 2, 3);
    let all = fx
        .store
        .list_buyer_contracts(&fx.buyer.id, None)
        .expect("list");
    assert_eq!(
        all.iter().map(|c| c.id.clone()).collect::<Vec<_>>(),
        vec![newer.id.clone(), older.id.clone()]
    );
    fx.store.accept_contract(&older.id, at(4)).expect("accept");
    let pending = fx
        .store
        .list_farmer_contracts(&fx.listing.farmer_id, Some(ContractStatus::Pending))
        .expect("list");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, newer.id);
    assert_eq!(fx.store.list_listings().expect("listings").len(), 1);
}

#[test]
fn duplicate_username_is_a_conflict_and_writes_nothing() {
    let store = SqliteStore::open_in_memory().expect("store");
    register(&store, "dup_user", Role::Buyer);
    let err = store
        .create_user(
            &NewUser {
                name: "Other".to_string(),
                username: "dup_user".to_string(),
                role: Role::Farmer,
                location: "Meru".to_string(),
                farmer_details: None,
            },
            "hash",
            at(1),
        )
        .expect_err("duplicate");
    assert_eq!(err.code, StoreErrorCode::Conflict);
    assert_eq!(store.stats().expect("stats").users, 1);
}

#[test]
fn farmer_profile_round_trips_details() {
    let store = SqliteStore::open_in_memory().expect("store");
    let farmer = register(&store, "grower", Role::Farmer);
    let profile = store
        .farmer_profile_for_user(&farmer.id)
        .expect("lookup")
        .expect("profile");
    assert_eq!(profile.experience_years, Some(12));
    assert_eq!(profile.crop_types, vec!["maize", "beans"]);
    assert!(store
        .buyer_profile_for_user(&farmer.id)
        .expect("lookup")
        .is_none());
    let creds = store
        .find_credentials("grower")
        .expect("lookup")
        .expect("credentials");
    assert_eq!(creds.password_hash, "hash");
    assert_eq!(creds.user, farmer);
}

#[test]
fn on_disk_store_persists_and_records_schema_version() {
    let root = tempdir().expect("tempdir");
    let path = root.path().join("nested").join("cropconnect.sqlite");
    let listing_id = {
        let fx = fixture(SqliteStore::open(&path).expect("open"), 7);
        fx.listing.id
    };
    let reopened = SqliteStore::open(&path).expect("reopen");
    let stats = reopened.stats().expect("stats");
    assert_eq!(stats.schema_version, SCHEMA_VERSION);
    assert_eq!(stats.users, 2);
    assert_eq!(stats.listings, 1);
    assert_eq!(
        reopened
            .get_listing(&listing_id)
            .expect("get")
            .expect("exists")
            .quantity_available,
        7
    );
}

#[test]
fn newer_schema_version_is_refused() {
    let root = tempdir().expect("tempdir");
    let path = root.path().join("future.sqlite");
    {
        let conn = rusqlite::Connection::open(&path).expect("open raw");
        conn.execute_batch(&format!("PRAGMA user_version={};", SCHEMA_VERSION + 1))
            .expect("bump version");
    }
    let err = match SqliteStore::open(&path) {
        Ok(_) => panic!("future schema must be refused"),
        Err(err) => err,
    };
    assert_eq!(err.code, StoreErrorCode::Validation);
}
