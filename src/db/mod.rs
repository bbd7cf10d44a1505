pub mod client;
pub mod schema;

pub use client::DbClient;
pub use schema::create_schema;
