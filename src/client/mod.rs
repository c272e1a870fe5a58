//! Client side of homebase - token storage, identity decoding, auth-state
//! broadcast and HTTP clients for the auth and data endpoints.

pub mod api_client;
pub mod auth_client;
pub mod session;
mod transport;

pub use api_client::ApiClient;
pub use auth_client::AuthClient;
pub use session::{AuthState, Identity, MemoryTokenStore, SessionManager, TokenStore, decode_identity};
