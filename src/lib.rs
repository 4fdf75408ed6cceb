//! fleetmap - EC2 launch template inventory for asset graphs
//!
//! This crate polls the EC2 API for launch templates and their versions,
//! reshapes them into flat graph records, and upserts them into a property
//! graph store. Records not re-observed in the current run are reaped once
//! every region has been loaded.

pub mod aws;
pub mod config;
pub mod graph;
pub mod sync;
