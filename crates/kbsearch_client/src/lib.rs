//! Search client: HTTP gateways, credentials and the session driver.
mod auth;
mod convert;
mod driver;
mod gateway;
mod http;
mod types;

pub use auth::{Credentials, MemoryCredentials};
pub use convert::{preview_failure, search_failure};
pub use driver::{DriverSettings, SessionDriver};
pub use gateway::{DocumentGateway, SearchGateway};
pub use http::{ClientSettings, HttpGateway};
pub use types::{FailureKind, GatewayError};
