pub mod connect;
pub mod deletion;
pub mod integrations;
