// handlers/mod.rs - Two-tier handler architecture
//
// Public (no auth) → Protected (bearer-token auth via middleware::auth)
pub mod protected;
pub mod public;
