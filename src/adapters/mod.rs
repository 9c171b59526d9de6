pub mod csv_import;
pub mod sqlite_store;
pub mod file_config_adapter;
pub mod web;
