pub mod config;
pub mod db;
pub mod deletion;
pub mod error;
pub mod exchange;
pub mod identity;
pub mod oauth_utils;
pub mod providers;
pub mod server;
pub mod signed_request;
pub mod state_token;

mod utils;

pub use error::GatewayError;
