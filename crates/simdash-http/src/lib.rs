//! HTTP client for the cloud simulation backend
//!
//! Implements `simdash_core::SimulationApi` over `reqwest`.

pub mod client;

pub use client::{DEFAULT_API_URL, DEFAULT_PRICING_URL, HttpSimulationApi};
