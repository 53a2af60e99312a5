//! acs_rs
//!
//! A small Rust library for querying the U.S. Census Bureau's American Community
//! Survey (ACS) API and merging several tables into one result table.
//!
//! ### Features
//! - Group flat variable ids (`DP03_0001E`, `B03002_001E`, whole tables like `S0101`)
//!   into one request per table, across the Data Profile, Detailed and Subject products
//! - Select state, county, place, tract, block group or ZCTA geographies by FIPS code
//! - Bounded retry per request and an audit log of every URL built
//! - Full outer join of per-table results on their geographic identifier columns
//! - Save results as CSV or JSON
//!
//! ### Example
//! ```no_run
//! use acs_rs::{AcsQuery, Client, GeographyLevel};
//!
//! let mut client = Client::from_env();
//! let table = client.call(
//!     &AcsQuery::new(["DP02_0001E", "B03002_004E", "S0101_C01_001E"])
//!         .geography(GeographyLevel::County)
//!         .state("53"),
//! )?;
//! acs_rs::storage::save_csv(&table, "wa_counties.csv")?;
//! for url in client.calls() {
//!     println!("{url}");
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod call_log;
pub mod config;
pub mod error;
pub mod geography;
pub mod models;
pub mod retry;
pub mod storage;
pub mod table;
pub mod transport;
pub mod variables;

pub use api::{AcsQuery, Client, MAX_VARIABLES_PER_CALL};
pub use call_log::CallLog;
pub use config::ClientConfig;
pub use error::AcsError;
pub use geography::{Codes, Geography, GeographyLevel, IntoCodes};
pub use models::{Selection, Survey, TableFamily, TableId, TableRequest};
pub use retry::RetryPolicy;
pub use table::{GEO_COLUMNS, ResultTable};
pub use transport::{HttpTransport, Transport};
