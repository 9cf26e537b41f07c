// Adapters layer: concrete implementations of the domain ports.

#[cfg(feature = "chromium")]
pub mod chromium;
pub mod input;
pub mod storage;
