pub mod config;
pub mod db;
pub mod json_writer;
pub mod text;
