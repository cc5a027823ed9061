// kr-api: Async Rust client for the Kismet REST control plane

pub mod client;
pub mod command;
pub mod datasource;
pub mod device;
pub mod error;
pub mod response;
pub mod session;
pub mod transport;

pub use client::{DEFAULT_PORT, KismetClient, server_url};
pub use command::Command;
pub use datasource::{Datasource, ProbedInterface};
pub use error::Error;
pub use session::Credentials;
pub use transport::TransportConfig;
