pub mod health;
pub mod jobs;
pub mod root;
pub mod status;
