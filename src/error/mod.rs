mod connect;
mod gateway;
mod oauth;
mod webhook;

pub use connect::ConnectError;
pub use gateway::{ApiErrorBody, ApiErrorObject, GatewayError};
pub use oauth::{ExchangeError, IdentityError, StateError};
pub use webhook::{VerifyError, WebhookError};
