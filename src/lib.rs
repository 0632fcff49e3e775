// float_cmp: only in tests where assert_eq! on f64 is intentional.
#![cfg_attr(test, allow(clippy::float_cmp))]

pub mod api;
pub mod config;
pub mod error;
pub mod proxy;
pub mod store;
