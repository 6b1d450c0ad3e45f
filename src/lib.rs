//! CDP Wallet Demo
//!
//! Drives a hosted wallet-as-a-service platform through a fixed demonstration
//! sequence, persisting the wallet credential so that every run reuses the
//! same wallet.

pub mod config;
pub mod demo;
pub mod manager;
pub mod platform;
pub mod storage;
pub mod types;
