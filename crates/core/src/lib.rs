//! # Meetgrid Core
//!
//! Domain logic for the Meetgrid scheduling service: the per-participant
//! availability grid, the cross-participant merge, and the transactional
//! slot-claim engine that turns a free cell into a confirmed booking with an
//! externally provisioned meeting link.
//!
//! Persistence, identity resolution and meeting provisioning are consumed
//! through the ports in [`ports`]; the `db` and `api` crates supply the
//! Postgres and HTTP implementations.

pub mod booking;
pub mod claim;
pub mod errors;
pub mod grid;
pub mod memory;
pub mod merge;
pub mod models;
pub mod ports;
