pub mod import_csv;
pub mod initdb;
pub mod openapi;
pub mod report;
pub mod serve;

pub use import_csv::import_csv;
pub use initdb::init_database;
pub use openapi::print_openapi;
pub use report::report;
pub use serve::serve;
