//! nRF52840 adapters for the library's hardware traits.
//!
//! Only built with the `embedded` feature. Peripherals that Embassy
//! drives asynchronously (SAADC, GPIO edges) are sampled by tasks into
//! small atomic caches, which the synchronous library traits then read.

pub mod analog;
pub mod buttons;
pub mod display;
pub mod encoder;
pub mod servo;
