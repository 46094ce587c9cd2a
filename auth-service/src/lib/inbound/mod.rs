pub mod http;
pub mod maintenance;
