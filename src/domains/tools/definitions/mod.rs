//! Tool definitions module.
//!
//! Each tool is defined in its own file and registered in
//! [`register_all_tools`](super::register_all_tools).

pub mod fetch_external_data;
pub mod greet;

pub use fetch_external_data::FetchExternalDataTool;
pub use greet::{GreetParams, GreetTool};
