pub mod context;
pub mod rest;

pub use context::ServiceContext;
pub use rest::{RestApi, StudentRecord};
