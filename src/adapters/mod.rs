pub mod database;
pub mod json;
