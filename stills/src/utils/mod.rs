//! Small helpers shared by the concrete pipeline steps.

pub mod filename;
pub mod fs;
pub mod http_client;
pub mod pattern;
