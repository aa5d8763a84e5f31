pub mod app_config;
pub mod observability;
pub mod server;
pub mod worker;

pub use app_config::*;
pub use observability::*;
pub use server::*;
pub use worker::*;
