// SPDX-License-Identifier: Apache-2.0

use std::path::Path;
use std::sync::Arc;

use cropconnect_api::{openapi_v1_spec, ContractDto, ListingDto, UserDto};
use cropconnect_core::SystemClock;
use cropconnect_lifecycle::{
    ContractLifecycleManager, ContractRequest, LifecyclePolicy, Registration,
};
use cropconnect_model::{FarmerDetails, Location, NewListing};
use cropconnect_store::SqliteStore;
use serde::Serialize;
use serde_json::{json, Value};

use crate::commands::{ContractCommand, ListingCommand, UserCommand};
use crate::{emit_ok, CliError, OutputMode};

type Manager = ContractLifecycleManager<SqliteStore>;

fn open_manager(db_path: &Path) -> Result<Manager, CliError> {
    let store = SqliteStore::open(db_path)?;
    Ok(ContractLifecycleManager::new(
        Arc::new(store),
        Arc::new(SystemClock),
        LifecyclePolicy::from_env(),
    ))
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, CliError> {
    serde_json::to_value(value).map_err(|e| CliError::internal(e.to_string()))
}

fn emit_result(output_mode: OutputMode, command: &str, data: Value) -> Result<(), CliError> {
    emit_ok(
        output_mode,
        &json!({
            "command": command,
            "status": "ok",
            "data": data,
        }),
    )
}

pub(crate) fn db_init(db_path: &Path, output_mode: OutputMode) -> Result<(), CliError> {
    let store = SqliteStore::open(db_path)?;
    let stats = store.stats()?;
    tracing::info!(
        db_path = %db_path.display(),
        schema_version = stats.schema_version,
        "database ready"
    );
    emit_result(
        output_mode,
        "db init",
        json!({
            "db_path": db_path.display().to_string(),
            "schema_version": stats.schema_version,
        }),
    )
}

pub(crate) fn db_inspect(db_path: &Path, output_mode: OutputMode) -> Result<(), CliError> {
    if !db_path.is_file() {
        return Err(CliError::storage(format!(
            "database {} does not exist; run `cropconnect db init`",
            db_path.display()
        ))
        .with_detail("db_path", &db_path.display().to_string()));
    }
    let stats = SqliteStore::open(db_path)?.stats()?;
    emit_result(
        output_mode,
        "db inspect",
        json!({
            "db_path": db_path.display().to_string(),
            "schema_version": stats.schema_version,
            "users": stats.users,
            "listings": stats.listings,
            "contracts": stats.contracts,
            "pending_contracts": stats.pending_contracts,
        }),
    )
}

pub(crate) fn run_user_command(
    command: UserCommand,
    db_path: &Path,
    output_mode: OutputMode,
) -> Result<(), CliError> {
    match command {
        UserCommand::Add {
            name,
            username,
            password,
            role,
            location,
            experience_years,
            farm_size,
            crop_types,
        } => {
            let has_details =
                experience_years.is_some() || farm_size.is_some() || !crop_types.is_empty();
            let registration = Registration {
                name,
                username,
                password,
                role,
                location,
                farmer_details: has_details.then_some(FarmerDetails {
                    experience_years,
                    farm_size,
                    crop_types,
                }),
            };
            let user = open_manager(db_path)?.register(registration)?;
            emit_result(output_mode, "user add", to_value(&UserDto::from(user))?)
        }
    }
}

pub(crate) fn run_listing_command(
    command: ListingCommand,
    db_path: &Path,
    output_mode: OutputMode,
) -> Result<(), CliError> {
    let manager = open_manager(db_path)?;
    match command {
        ListingCommand::Add {
            as_user,
            name,
            description,
            price,
            quantity,
            address,
            latitude,
            longitude,
            image_url,
        } => {
            let actor = manager.actor_for_username(&as_user)?;
            let listing = manager.create_listing(
                &actor,
                NewListing {
                    name,
                    description,
                    price,
                    quantity,
                    location: Location {
                        address,
                        latitude,
                        longitude,
                    },
                    image_url,
                },
            )?;
            emit_result(output_mode, "listing add", to_value(&ListingDto::from(listing))?)
        }
        ListingCommand::List => {
            let listings: Vec<ListingDto> = manager
                .list_listings()?
                .into_iter()
                .map(ListingDto::from)
                .collect();
            emit_result(output_mode, "listing list", to_value(&listings)?)
        }
    }
}

pub(crate) fn run_contract_command(
    command: ContractCommand,
    db_path: &Path,
    output_mode: OutputMode,
) -> Result<(), CliError> {
    let manager = open_manager(db_path)?;
    match command {
        ContractCommand::Create {
            as_user,
            listing,
            quantity,
            delivery_date,
            notes,
        } => {
            let actor = manager.actor_for_username(&as_user)?;
            let contract = manager.create_contract(
                &actor,
                ContractRequest {
                    listing_id: listing,
                    quantity_requested: quantity,
                    delivery_date,
                    notes,
                },
            )?;
            emit_result(
                output_mode,
                "contract create",
                to_value(&ContractDto::from(contract))?,
            )
        }
        ContractCommand::Transition {
            as_user,
            contract,
            status,
        } => {
            let actor = manager.actor_for_username(&as_user)?;
            let updated = manager.transition_status(&actor, &contract, &status)?;
            emit_result(
                output_mode,
                "contract transition",
                to_value(&ContractDto::from(updated))?,
            )
        }
        ContractCommand::List { as_user, status } => {
            let actor = manager.actor_for_username(&as_user)?;
            let contracts: Vec<ContractDto> = manager
                .list_contracts(&actor, status.as_deref())?
                .into_iter()
                .map(ContractDto::from)
                .collect();
            emit_result(output_mode, "contract list", to_value(&contracts)?)
        }
    }
}

pub(crate) fn print_openapi(output_mode: OutputMode) -> Result<(), CliError> {
    emit_ok(output_mode, &openapi_v1_spec())
}
