// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use cropconnect_model::{
    BuyerId, BuyerProfile, Contract, ContractId, ContractStatus, FarmerId, FarmerProfile, Listing,
    ListingId, NewContract, NewListing, NewUser, Role, User, UserId,
};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

use crate::error::{StoreError, StoreErrorCode};
use crate::rows::{
    encode_date, encode_ts, to_sql_quantity, ContractRow, FarmerRow, ListingRow, UserRow,
    CONTRACT_COLUMNS, LISTING_COLUMNS, USER_COLUMNS,
};
use crate::schema::{migrate, read_schema_version};
use crate::traits::{AccountStore, ContractStore, ListingStore, UserCredentials};

/// Kept below the server's default read timeout.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub schema_version: i64,
    pub users: u64,
    pub listings: u64,
    pub contracts: u64,
    pub pending_contracts: u64,
}

/// Single-connection sqlite backend. Writers take `BEGIN IMMEDIATE` so other
/// processes sharing the file serialize behind the same lock.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::new(StoreErrorCode::Io, e.to_string()))?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(mut conn: Connection) -> Result<Self, StoreError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        migrate(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::internal("sqlite connection lock poisoned"))
    }

    pub fn stats(&self) -> Result<StoreStats, StoreError> {
        let conn = self.lock()?;
        let count = |sql: &str| -> Result<u64, StoreError> {
            let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
            Ok(u64::try_from(n).unwrap_or(0))
        };
        Ok(StoreStats {
            schema_version: read_schema_version(&conn)?,
            users: count("SELECT COUNT(*) FROM users")?,
            listings: count("SELECT COUNT(*) FROM listings")?,
            contracts: count("SELECT COUNT(*) FROM contracts")?,
            pending_contracts: count("SELECT COUNT(*) FROM contracts WHERE status = 'PENDING'")?,
        })
    }
}

fn select_contract(tx: &Connection, id: &str) -> Result<Option<Contract>, StoreError> {
    tx.query_row(
        &format!("SELECT {CONTRACT_COLUMNS} WHERE c.id = ?1"),
        params![id],
        ContractRow::read,
    )
    .optional()?
    .map(ContractRow::into_contract)
    .transpose()
}

fn select_listing(tx: &Connection, id: &str) -> Result<Option<Listing>, StoreError> {
    tx.query_row(
        &format!("SELECT {LISTING_COLUMNS} WHERE id = ?1"),
        params![id],
        ListingRow::read,
    )
    .optional()?
    .map(ListingRow::into_listing)
    .transpose()
}

fn require_contract(tx: &Connection, id: &ContractId) -> Result<Contract, StoreError> {
    select_contract(tx, id.as_str())?.ok_or_else(|| {
        StoreError::new(StoreErrorCode::NotFound, format!("contract {id} not found"))
    })
}

fn stale(id: &ContractId, expected: ContractStatus, actual: ContractStatus) -> StoreError {
    StoreError::new(
        StoreErrorCode::StaleStatus,
        format!("contract {id} is {actual}, expected {expected}"),
    )
}

fn immediate(conn: &mut Connection) -> Result<Transaction<'_>, StoreError> {
    Ok(conn.transaction_with_behavior(TransactionBehavior::Immediate)?)
}

fn collect_contracts(
    conn: &Connection,
    owner_clause: &str,
    owner: &str,
    status: Option<ContractStatus>,
) -> Result<Vec<Contract>, StoreError> {
    let sql = format!(
        "SELECT {CONTRACT_COLUMNS} WHERE {owner_clause} = ?1 \
         AND (?2 IS NULL OR c.status = ?2) ORDER BY c.created_at DESC, c.id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![owner, status.map(ContractStatus::as_str)], ContractRow::read)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(ContractRow::into_contract).collect()
}

fn collect_listings(
    conn: &Connection,
    farmer: Option<&FarmerId>,
) -> Result<Vec<Listing>, StoreError> {
    let sql = format!(
        "SELECT {LISTING_COLUMNS} WHERE (?1 IS NULL OR farmer_id = ?1) \
         ORDER BY created_at DESC, id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![farmer.map(FarmerId::as_str)], ListingRow::read)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(ListingRow::into_listing).collect()
}

impl AccountStore for SqliteStore {
    fn create_user(
        &self,
        user: &NewUser,
        password_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<User, StoreError> {
        let mut conn = self.lock()?;
        let tx = immediate(&mut conn)?;
        let taken: Option<String> = tx
            .query_row(
                "SELECT id FROM users WHERE username = ?1",
                params![user.username],
                |row| row.get(0),
            )
            .optional()?;
        if taken.is_some() {
            return Err(StoreError::new(
                StoreErrorCode::Conflict,
                format!("username `{}` is already taken", user.username),
            ));
        }
        let id = UserId::generate();
        tx.execute(
            "INSERT INTO users (id, name, username, password_hash, role, location, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id.as_str(),
                user.name.trim(),
                user.username,
                password_hash,
                user.role.as_str(),
                user.location.trim(),
                encode_ts(at)
            ],
        )?;
        match user.role {
            Role::Farmer => {
                let details = user.farmer_details.clone().unwrap_or_default();
                let crop_types = serde_json::to_string(&details.crop_types)
                    .map_err(|e| StoreError::internal(e.to_string()))?;
                tx.execute(
                    "INSERT INTO farmers (id, user_id, experience_years, farm_size, crop_types)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        FarmerId::generate().as_str(),
                        id.as_str(),
                        details.experience_years,
                        details.farm_size,
                        crop_types
                    ],
                )?;
            }
            Role::Buyer => {
                tx.execute(
                    "INSERT INTO buyers (id, user_id) VALUES (?1, ?2)",
                    params![BuyerId::generate().as_str(), id.as_str()],
                )?;
            }
        }
        let created = tx
            .query_row(
                &format!("SELECT {USER_COLUMNS} WHERE id = ?1"),
                params![id.as_str()],
                UserRow::read,
            )?
            .into_user()?;
        tx.commit()?;
        Ok(created)
    }

    fn find_credentials(&self, username: &str) -> Result<Option<UserCredentials>, StoreError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} WHERE username = ?1"),
                params![username],
                UserRow::read,
            )
            .optional()?;
        row.map(|row| -> Result<UserCredentials, StoreError> {
            let password_hash = row.password_hash.clone();
            Ok(UserCredentials {
                user: row.into_user()?,
                password_hash,
            })
        })
        .transpose()
    }

    fn get_user(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} WHERE id = ?1"),
            params![id.as_str()],
            UserRow::read,
        )
        .optional()?
        .map(UserRow::into_user)
        .transpose()
    }

    fn farmer_profile_for_user(&self, id: &UserId) -> Result<Option<FarmerProfile>, StoreError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, user_id, experience_years, farm_size, crop_types
             FROM farmers WHERE user_id = ?1",
            params![id.as_str()],
            FarmerRow::read,
        )
        .optional()?
        .map(FarmerRow::into_profile)
        .transpose()
    }

    fn buyer_profile_for_user(&self, id: &UserId) -> Result<Option<BuyerProfile>, StoreError> {
        let conn = self.lock()?;
        let row: Option<String> = conn
            .query_row(
                "SELECT id FROM buyers WHERE user_id = ?1",
                params![id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        row.map(|buyer_id| -> Result<BuyerProfile, StoreError> {
            Ok(BuyerProfile {
                id: BuyerId::parse(buyer_id)
                    .map_err(|e| StoreError::internal(format!("corrupt buyer id: {e}")))?,
                user_id: id.clone(),
            })
        })
        .transpose()
    }
}

impl ListingStore for SqliteStore {
    fn create_listing(
        &self,
        farmer_id: &FarmerId,
        listing: &NewListing,
        at: DateTime<Utc>,
    ) -> Result<Listing, StoreError> {
        let quantity = to_sql_quantity(listing.quantity)?;
        let mut conn = self.lock()?;
        let tx = immediate(&mut conn)?;
        let id = ListingId::generate();
        tx.execute(
            "INSERT INTO listings (id, farmer_id, name, description, price, quantity_available,
                                   address, latitude, longitude, image_url, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                id.as_str(),
                farmer_id.as_str(),
                listing.name.trim(),
                listing.description.trim(),
                listing.price,
                quantity,
                listing.location.address.trim(),
                listing.location.latitude,
                listing.location.longitude,
                listing.image_url,
                encode_ts(at)
            ],
        )?;
        let created = select_listing(&tx, id.as_str())?
            .ok_or_else(|| StoreError::internal("inserted listing vanished"))?;
        tx.commit()?;
        Ok(created)
    }

    fn get_listing(&self, id: &ListingId) -> Result<Option<Listing>, StoreError> {
        let conn = self.lock()?;
        select_listing(&conn, id.as_str())
    }

    fn list_listings(&self) -> Result<Vec<Listing>, StoreError> {
        let conn = self.lock()?;
        collect_listings(&conn, None)
    }

    fn list_farmer_listings(&self, farmer_id: &FarmerId) -> Result<Vec<Listing>, StoreError> {
        let conn = self.lock()?;
        collect_listings(&conn, Some(farmer_id))
    }

    fn delete_listing(&self, id: &ListingId) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = immediate(&mut conn)?;
        if select_listing(&tx, id.as_str())?.is_none() {
            return Err(StoreError::new(
                StoreErrorCode::NotFound,
                format!("listing {id} not found"),
            ));
        }
        let referenced: i64 = tx.query_row(
            "SELECT COUNT(*) FROM contracts WHERE listing_id = ?1",
            params![id.as_str()],
            |row| row.get(0),
        )?;
        if referenced > 0 {
            return Err(StoreError::new(
                StoreErrorCode::Conflict,
                format!("listing {id} is referenced by {referenced} contract(s)"),
            ));
        }
        tx.execute("DELETE FROM listings WHERE id = ?1", params![id.as_str()])?;
        tx.commit()?;
        Ok(())
    }
}

impl ContractStore for SqliteStore {
    fn create_contract(
        &self,
        contract: &NewContract,
        at: DateTime<Utc>,
    ) -> Result<Contract, StoreError> {
        let quantity = to_sql_quantity(contract.quantity_requested)?;
        let mut conn = self.lock()?;
        let tx = immediate(&mut conn)?;
        if select_listing(&tx, contract.listing_id.as_str())?.is_none() {
            return Err(StoreError::new(
                StoreErrorCode::NotFound,
                format!("listing {} not found", contract.listing_id),
            ));
        }
        let id = ContractId::generate();
        let ts = encode_ts(at);
        tx.execute(
            "INSERT INTO contracts (id, listing_id, buyer_id, quantity_requested, delivery_date,
                                    status, notes, created_at, status_changed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                id.as_str(),
                contract.listing_id.as_str(),
                contract.buyer_id.as_str(),
                quantity,
                encode_date(contract.delivery_date),
                ContractStatus::Pending.as_str(),
                contract.notes,
                ts
            ],
        )?;
        let created = require_contract(&tx, &id)?;
        tx.commit()?;
        Ok(created)
    }

    fn get_contract(&self, id: &ContractId) -> Result<Option<Contract>, StoreError> {
        let conn = self.lock()?;
        select_contract(&conn, id.as_str())
    }

    fn list_buyer_contracts(
        &self,
        buyer_id: &BuyerId,
        status: Option<ContractStatus>,
    ) -> Result<Vec<Contract>, StoreError> {
        let conn = self.lock()?;
        collect_contracts(&conn, "c.buyer_id", buyer_id.as_str(), status)
    }

    fn list_farmer_contracts(
        &self,
        farmer_id: &FarmerId,
        status: Option<ContractStatus>,
    ) -> Result<Vec<Contract>, StoreError> {
        let conn = self.lock()?;
        collect_contracts(&conn, "l.farmer_id", farmer_id.as_str(), status)
    }

    fn accept_contract(
        &self,
        id: &ContractId,
        at: DateTime<Utc>,
    ) -> Result<Contract, StoreError> {
        let mut conn = self.lock()?;
        let tx = immediate(&mut conn)?;
        let current = require_contract(&tx, id)?;
        if current.status != ContractStatus::Pending {
            return Err(stale(id, ContractStatus::Pending, current.status));
        }
        let moved = tx.execute(
            "UPDATE contracts SET status = ?1, status_changed_at = ?2
             WHERE id = ?3 AND status = ?4",
            params![
                ContractStatus::Accepted.as_str(),
                encode_ts(at),
                id.as_str(),
                ContractStatus::Pending.as_str()
            ],
        )?;
        if moved == 0 {
            return Err(stale(id, ContractStatus::Pending, current.status));
        }
        let quantity = to_sql_quantity(current.quantity_requested)?;
        let decremented = tx.execute(
            "UPDATE listings SET quantity_available = quantity_available - ?1
             WHERE id = ?2 AND quantity_available >= ?1",
            params![quantity, current.listing_id.as_str()],
        )?;
        if decremented == 0 {
            let available = select_listing(&tx, current.listing_id.as_str())?
                .map_or(0, |listing| listing.quantity_available);
            // Dropping `tx` rolls the status update back.
            return Err(StoreError::new(
                StoreErrorCode::InsufficientInventory,
                format!(
                    "listing {} has {available} available, contract {id} needs {}",
                    current.listing_id, current.quantity_requested
                ),
            ));
        }
        let accepted = require_contract(&tx, id)?;
        tx.commit()?;
        Ok(accepted)
    }

    fn update_contract_status(
        &self,
        id: &ContractId,
        from: ContractStatus,
        to: ContractStatus,
        at: DateTime<Utc>,
    ) -> Result<Contract, StoreError> {
        let mut conn = self.lock()?;
        let tx = immediate(&mut conn)?;
        let moved = tx.execute(
            "UPDATE contracts SET status = ?1, status_changed_at = ?2
             WHERE id = ?3 AND status = ?4",
            params![to.as_str(), encode_ts(at), id.as_str(), from.as_str()],
        )?;
        let current = require_contract(&tx, id)?;
        if moved == 0 {
            return Err(stale(id, from, current.status));
        }
        tx.commit()?;
        Ok(current)
    }
}
