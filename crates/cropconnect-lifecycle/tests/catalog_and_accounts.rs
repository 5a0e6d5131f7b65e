// SPDX-License-Identifier: Apache-2.0

mod support;

use cropconnect_lifecycle::{LifecycleError, Registration};
use cropconnect_model::{FarmerDetails, Location, NewListing, Role};
use support::{contract, listing, register, world};

fn registration(username: &str, role: &str) -> Registration {
    Registration {
        name: "Dee".to_string(),
        username: username.to_string(),
        password: "long-enough".to_string(),
        role: role.to_string(),
        location: "Thika".to_string(),
        farmer_details: None,
    }
}

#[test]
fn login_accepts_only_matching_credentials_and_role() {
    let w = world();
    let user = w
        .manager
        .login("farmer_ann", "s3cret-pass", "farmer")
        .expect("login");
    assert_eq!(user.id, w.farmer.user_id);

    for (username, password, role) in [
        ("farmer_ann", "wrong-pass", "FARMER"),
        ("farmer_ann", "s3cret-pass", "BUYER"),
        ("nobody_here", "s3cret-pass", "FARMER"),
    ] {
        let err = w
            .manager
            .login(username, password, role)
            .expect_err("rejected");
        assert_eq!(
            err,
            LifecycleError::Unauthenticated("invalid username, password or role".to_string())
        );
    }
}

#[test]
fn registration_rejects_duplicates_and_bad_input() {
    let w = world();
    let err = w
        .manager
        .register(registration("buyer_bob", "BUYER"))
        .expect_err("duplicate");
    assert_eq!(err.kind(), "conflict");

    let err = w
        .manager
        .register(registration("new_user", "ADMIN"))
        .expect_err("role");
    assert_eq!(err.kind(), "validation_failed");

    let mut short = registration("new_user", "BUYER");
    short.password = "short".to_string();
    assert_eq!(
        w.manager.register(short).expect_err("password").kind(),
        "validation_failed"
    );

    let mut blank = registration("new_user", "BUYER");
    blank.location = "   ".to_string();
    assert_eq!(
        w.manager.register(blank).expect_err("location").kind(),
        "validation_failed"
    );
}

#[test]
fn farmer_profile_carries_registration_details() {
    let w = world();
    let mut reg = registration("grower_two", "FARMER");
    reg.farmer_details = Some(FarmerDetails {
        experience_years: Some(3),
        farm_size: Some(1.5),
        crop_types: vec!["kale".to_string()],
    });
    let user = w.manager.register(reg).expect("register");
    let actor = cropconnect_model::Actor::new(user.id, Role::Farmer);
    let profile = w.manager.farmer_profile(&actor).expect("profile");
    assert_eq!(profile.crop_types, vec!["kale"]);
    assert_eq!(
        w.manager.farmer_profile(&w.buyer).expect_err("buyer").kind(),
        "unauthorized"
    );
}

#[test]
fn operator_lookup_resolves_accounts_by_username() {
    let w = world();
    assert_eq!(
        w.manager.actor_for_username(" buyer_bob ").expect("actor"),
        w.buyer
    );
    assert_eq!(
        w.manager
            .actor_for_username("ghost")
            .expect_err("unknown")
            .kind(),
        "unauthenticated"
    );
}

#[test]
fn session_claims_must_match_the_account() {
    let w = world();
    assert_eq!(
        w.manager.current_user(&w.buyer).expect("user").username,
        "buyer_bob"
    );
    let forged = cropconnect_model::Actor::new(w.buyer.user_id.clone(), Role::Farmer);
    assert_eq!(
        w.manager.current_user(&forged).expect_err("role").kind(),
        "unauthenticated"
    );
}

#[test]
fn only_farmers_with_profiles_create_listings() {
    let w = world();
    let draft = NewListing {
        name: "Mangoes".to_string(),
        description: "Apple mango".to_string(),
        price: 0.3,
        quantity: 500,
        location: Location {
            address: "Makueni".to_string(),
            latitude: None,
            longitude: None,
        },
        image_url: None,
    };
    let err = w
        .manager
        .create_listing(&w.buyer, draft.clone())
        .expect_err("buyer");
    assert_eq!(err.kind(), "profile_not_found");

    let err = w
        .manager
        .create_listing(
            &w.farmer,
            NewListing {
                price: 0.0,
                ..draft.clone()
            },
        )
        .expect_err("price");
    assert_eq!(err.kind(), "validation_failed");

    let created = w.manager.create_listing(&w.farmer, draft).expect("create");
    let mine = w.manager.list_farmer_listings(&w.farmer).expect("mine");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0], created);
    assert_eq!(w.manager.list_listings().expect("all").len(), 1);
}

#[test]
fn delete_listing_is_owner_only_and_guarded() {
    let w = world();
    let other_farmer = register(&w.manager, "farmer_zed", Role::Farmer);
    let crop = listing(&w, 10);

    let err = w
        .manager
        .delete_listing(&other_farmer, crop.id.as_str())
        .expect_err("not owner");
    assert_eq!(err.kind(), "unauthorized");

    contract(&w, &crop, 2);
    let err = w
        .manager
        .delete_listing(&w.farmer, crop.id.as_str())
        .expect_err("referenced");
    assert_eq!(err.kind(), "conflict");

    let spare = listing(&w, 1);
    w.manager
        .delete_listing(&w.farmer, spare.id.as_str())
        .expect("delete");
    let err = w
        .manager
        .get_listing(spare.id.as_str())
        .expect_err("gone");
    assert_eq!(err.kind(), "listing_not_found");
}
