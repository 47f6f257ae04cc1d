//! API handlers for the café backend.
//!
//! `auth/` holds the account lifecycle; `account` the authenticated
//! self-service routes; `health` the probes.

pub mod account;
pub mod auth;
pub mod health;
pub mod me;
