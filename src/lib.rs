pub mod app;
pub mod common;
pub mod shutdown;
