//! Values the user-mode client and the filter driver must agree on.
//!
//! Kept dependency-free and `no_std` so the driver side can consume the
//! same definitions.
#![no_std]

pub mod constants;
