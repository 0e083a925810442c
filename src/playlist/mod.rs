//! # Playlist Module
//!
//! Keeps the generated playlists in line with the user's current rankings.
//!
//! - [`reconcile`] compares the previous ordered track list of a playlist
//!   with the desired one and, if they differ, clears and repopulates the
//!   playlist in batches of at most [`MAX_BATCH_SIZE`] items.
//! - [`CategorySync`] runs one playlist category ([`Category::TopTracks`] or
//!   [`Category::TopArtistsTracks`]) for one user over all three time
//!   ranges: it finds or creates the target playlist, refreshes its
//!   description, builds the desired track list and reconciles.
//!
//! [`Category::TopTracks`]: crate::types::Category::TopTracks
//! [`Category::TopArtistsTracks`]: crate::types::Category::TopArtistsTracks

mod category;
mod reconcile;

pub use category::{CategorySync, TermOutcome};
pub use reconcile::{MAX_BATCH_SIZE, reconcile};
