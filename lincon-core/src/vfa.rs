//! Linear function approximators.
mod base;
mod config;
mod state;
mod state_action;
pub use base::LinearVfa;
pub use config::LinearVfaConfig;
pub use state::LinearStateVfa;
pub use state_action::LinearStateActionVfa;
