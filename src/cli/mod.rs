//! # CLI Module
//!
//! Command implementations behind the `topsync` binary. Each command takes
//! the fully resolved [`Config`](crate::config::Config) and reports through
//! the logging macros; start-up failures end the process via `error!`.
//!
//! - [`run`] - one pass over all users, printing the invocation response
//! - [`auth`] - interactive first-time authorization of one user
//! - [`registry`] - table of the playlists recorded per user

mod auth;
mod registry;
mod run;

pub use auth::auth;
pub use registry::registry;
pub use run::run;
