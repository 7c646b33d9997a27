//! Ferremas Core - Shared domain types.
//!
//! This crate provides the validated types used across the Ferremas workspace:
//! - `api` - REST backend for users, payments and dispatch records
//! - `cli` - Command-line tools for migrations and administrator bootstrap
//!
//! # Architecture
//!
//! The core crate contains only types and parsing rules - no I/O, no database
//! access, no HTTP. Enabling the `postgres` feature adds sqlx encode/decode
//! impls so the types can be bound and read directly.
//!
//! # Modules
//!
//! - [`types`] - Newtypes for IDs, RUTs, emails, phones, roles, dispatch kinds and amounts

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
