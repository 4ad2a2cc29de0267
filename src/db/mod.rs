//! Database module: pool bootstrap and the read path for personalities.
//!
//! Layout:
//! - `connection.rs`: TLS profile registry, DSN and pool construction
//! - `query.rs`: query runner and the timed row cursor
//! - `mapper.rs`: cursor to `Personality` conversion
//! - `models.rs`: the `Personality` record and row decoding
//! - `store.rs`: the `PersonalityStore` seam handed to the HTTP layer

pub mod connection;
pub mod mapper;
pub mod models;
pub mod query;
pub mod store;

pub use connection::{TlsRegistry, initialize};
pub use models::{Personality, PersonalityRow};
pub use query::{QueryRunner, RowCursor};
pub use store::{MySqlPersonalityStore, PersonalityStore};
