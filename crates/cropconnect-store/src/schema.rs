// SPDX-License-Identifier: Apache-2.0

use rusqlite::Connection;

use crate::error::{StoreError, StoreErrorCode};

pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA_V1: &str = "
CREATE TABLE IF NOT EXISTS users (
  id TEXT PRIMARY KEY,
  name TEXT NOT NULL,
  username TEXT NOT NULL UNIQUE,
  password_hash TEXT NOT NULL,
  role TEXT NOT NULL CHECK (role IN ('FARMER', 'BUYER')),
  location TEXT NOT NULL,
  created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS farmers (
  id TEXT PRIMARY KEY,
  user_id TEXT NOT NULL UNIQUE REFERENCES users(id),
  experience_years INTEGER,
  farm_size REAL,
  crop_types TEXT NOT NULL DEFAULT '[]'
);
CREATE TABLE IF NOT EXISTS buyers (
  id TEXT PRIMARY KEY,
  user_id TEXT NOT NULL UNIQUE REFERENCES users(id)
);
CREATE TABLE IF NOT EXISTS listings (
  id TEXT PRIMARY KEY,
  farmer_id TEXT NOT NULL REFERENCES farmers(id),
  name TEXT NOT NULL,
  description TEXT NOT NULL,
  price REAL NOT NULL CHECK (price > 0),
  quantity_available INTEGER NOT NULL CHECK (quantity_available >= 0),
  address TEXT NOT NULL,
  latitude REAL,
  longitude REAL,
  image_url TEXT,
  created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS contracts (
  id TEXT PRIMARY KEY,
  listing_id TEXT NOT NULL REFERENCES listings(id),
  buyer_id TEXT NOT NULL REFERENCES buyers(id),
  quantity_requested INTEGER NOT NULL CHECK (quantity_requested > 0),
  delivery_date TEXT NOT NULL,
  status TEXT NOT NULL CHECK (status IN ('PENDING', 'ACCEPTED', 'IN_TRANSIT', 'DELIVERED', 'CANCELLED')),
  notes TEXT NOT NULL DEFAULT '',
  created_at TEXT NOT NULL,
  status_changed_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_listings_farmer ON listings(farmer_id, created_at);
CREATE INDEX IF NOT EXISTS idx_contracts_listing ON contracts(listing_id);
CREATE INDEX IF NOT EXISTS idx_contracts_buyer ON contracts(buyer_id, created_at);
";

pub(crate) fn read_schema_version(conn: &Connection) -> Result<i64, StoreError> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

pub(crate) fn migrate(conn: &mut Connection) -> Result<(), StoreError> {
    let current = read_schema_version(conn)?;
    if current > SCHEMA_VERSION {
        return Err(StoreError::new(
            StoreErrorCode::Validation,
            format!("database schema version {current} is newer than supported {SCHEMA_VERSION}"),
        ));
    }
    if current == SCHEMA_VERSION {
        return Ok(());
    }
    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA_V1)?;
    tx.execute_batch(&format!("PRAGMA user_version={SCHEMA_VERSION};"))?;
    tx.commit()?;
    tracing::info!(from = current, to = SCHEMA_VERSION, "sqlite schema migrated");
    Ok(())
}
