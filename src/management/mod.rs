mod auth;
mod registry;
mod users;

pub use auth::TokenManager;
pub use registry::{Registry, RegistryManager, TermUris, UserPlaylists};
pub use users::UserList;
