// SPDX-License-Identifier: Apache-2.0

use clap::Subcommand;

#[derive(Subcommand)]
pub(crate) enum DbCommand {
    /// Create the database file and apply schema migrations.
    Init,
    /// Print the schema version and row counts.
    Inspect,
}

#[derive(Subcommand)]
pub(crate) enum UserCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        /// FARMER or BUYER.
        #[arg(long)]
        role: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        experience_years: Option<u32>,
        #[arg(long)]
        farm_size: Option<f64>,
        /// Comma separated.
        #[arg(long, value_delimiter = ',')]
        crop_types: Vec<String>,
    },
}

#[derive(Subcommand)]
pub(crate) enum ListingCommand {
    Add {
        /// Username of the owning farmer.
        #[arg(long = "as")]
        as_user: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        quantity: u64,
        #[arg(long)]
        address: String,
        #[arg(long)]
        latitude: Option<f64>,
        #[arg(long)]
        longitude: Option<f64>,
        #[arg(long)]
        image_url: Option<String>,
    },
    List,
}

#[derive(Subcommand)]
pub(crate) enum ContractCommand {
    /// Request a contract against a listing as the named buyer.
    Create {
        #[arg(long = "as")]
        as_user: String,
        #[arg(long)]
        listing: String,
        #[arg(long)]
        quantity: i64,
        /// YYYY-MM-DD.
        #[arg(long)]
        delivery_date: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Apply a status transition as the named account, with the API's rules.
    Transition {
        #[arg(long = "as")]
        as_user: String,
        #[arg(long)]
        contract: String,
        #[arg(long)]
        status: String,
    },
    List {
        #[arg(long = "as")]
        as_user: String,
        #[arg(long)]
        status: Option<String>,
    },
}
