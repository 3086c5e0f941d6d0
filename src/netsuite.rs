pub mod auth;
pub use auth::NetSuiteAuth;
pub mod client;
pub use client::NetSuiteClient;
pub mod row;
pub use row::Row;
