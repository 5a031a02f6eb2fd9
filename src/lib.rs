// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod aim;
pub mod config;
pub mod drill;
pub mod input;
pub mod motion;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod util;
