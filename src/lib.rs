#[macro_use]
extern crate rust_i18n;

pub mod config;
pub mod error;
pub mod google;
pub mod handlers;
pub mod session;
pub mod shutdown;
pub mod startup;
pub mod utils;

// Initialize i18n
i18n!("locales", fallback = "en");
