//! Application layer - use cases and orchestration.
//!
//! This layer sequences configuration rendering, wrapper deployment and
//! wrapper invocation for each command.

pub mod config_deployer;
pub mod env_persister;
pub mod service_manager;
pub mod wrapper;

pub use service_manager::ServiceManager;
pub use wrapper::WrapperVerb;
