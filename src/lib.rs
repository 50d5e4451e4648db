//! Promo Platform - Promo Code Lifecycle and Redemption Engine
//!
//! Companies publish promo codes with targeting rules and capacity limits;
//! users browse, like, comment on and redeem them behind an external fraud
//! check. Redemption hands out each unit of capacity exactly once, even under
//! concurrent load, by committing capacity changes with a compare-and-swap on
//! a per-promo version.
//!
//! The crate follows a hexagonal layout: `domain` holds the rules, `ports`
//! the collaborator contracts, `adapters` the Postgres/Redis/HTTP and
//! in-memory implementations, and `application` the handlers that compose
//! them. `bootstrap` wires everything from an [`config::AppConfig`].

pub mod adapters;
pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
