pub mod database;
pub mod spreadsheet;
pub mod transform;

pub use database::extract_database;
pub use spreadsheet::extract_spreadsheet;
pub use transform::Harvest;
