#![doc(test(attr(deny(warnings))))]

//! Tradebook Core prices quotes and invoices and reconciles bank lines
//! against expenses and paid invoices for a small trade business.

pub mod cli;
pub mod config;
pub mod core;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Tradebook Core tracing initialized.");
    });
}
