//! Test doubles shared with downstream crates.

mod odis;

pub use odis::MockOdis;
