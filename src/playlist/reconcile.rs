use crate::{Res, spotify::SpotifyApi};

/// Largest number of items Spotify accepts in one add or remove request.
pub const MAX_BATCH_SIZE: usize = 100;

/// Replaces the content of `playlist_uri` with `desired` unless it already
/// equals `previous`.
///
/// Equality is on the ordered sequence: the same tracks in a different order
/// count as a change. When a change is needed, every URI of `previous` is
/// removed and then every URI of `desired` is appended, both in order and in
/// batches of at most [`MAX_BATCH_SIZE`]. An empty `previous` issues no
/// remove call, an empty `desired` no add call.
///
/// Returns whether the playlist was modified.
///
/// # Errors
///
/// The first failing batch aborts the replacement and its error is
/// returned. Batches already sent are not rolled back.
pub async fn reconcile(
    api: &dyn SpotifyApi,
    playlist_uri: &str,
    desired: &[String],
    previous: &[String],
) -> Res<bool> {
    if previous == desired {
        return Ok(false);
    }

    for batch in previous.chunks(MAX_BATCH_SIZE) {
        api.remove_items(playlist_uri, batch).await?;
    }
    for batch in desired.chunks(MAX_BATCH_SIZE) {
        api.add_items(playlist_uri, batch).await?;
    }

    Ok(true)
}
