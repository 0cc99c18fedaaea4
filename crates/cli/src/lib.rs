//! projrelay command-line front end
//!
//! Wires the change sources, providers and transport around the debouncer.

pub mod cmd;
pub mod config;
pub mod logging;
pub mod providers;
pub mod transport;
