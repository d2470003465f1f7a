//! HTTP inbound adapter exposing REST endpoints.

pub mod caller;
pub mod error;
pub mod events;
pub mod health;
pub mod home;
pub mod login;
pub mod schemas;
pub mod state;
pub mod validation;

pub use error::ApiResult;
