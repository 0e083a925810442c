//! # API Module
//!
//! HTTP endpoints of the short-lived server started by `topsync auth`.
//!
//! - [`callback`] - completes the authorization code flow: checks the
//!   `state` parameter, exchanges the code at the token endpoint and hands
//!   the token to the waiting auth flow.
//! - [`health`] - returns status and version, handy to check that the
//!   redirect URL actually reaches this process.

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
