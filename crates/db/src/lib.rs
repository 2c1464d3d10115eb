//! SQLite persistence for maildesk: connection pooling, migrations, the
//! repository implementations of the core ports, and the static order
//! fixture directory.

pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod orders;
pub mod repositories;

pub use connection::{connect, DbPool};
pub use orders::StaticOrderBook;
