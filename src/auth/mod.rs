//! OAuth token lifecycle: exchange, refresh, persistence.

pub mod error;
pub mod spotify;
pub mod store;
pub mod token;

pub use error::AuthError;
pub use spotify::SpotifyAuth;
pub use store::{FileTokenStore, TokenStore};
pub use token::TokenRecord;
