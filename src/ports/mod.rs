pub mod store_port;
pub mod config_port;
