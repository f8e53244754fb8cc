//! `storekeep-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the inventory and
//! store crates (no IO, no logging).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use aggregate::AggregateRoot;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{Sku, StoreId};
pub use value_object::ValueObject;
