pub mod aws;
pub mod bundle;
pub mod environment;
pub mod errors;
pub mod platform;
pub mod project;
pub mod resolve;
pub mod solution_stack;
pub mod version;
