pub mod config;
pub mod workflow_store;

pub use config::AppConfig;
pub use workflow_store::{WorkflowListing, WorkflowStore};
