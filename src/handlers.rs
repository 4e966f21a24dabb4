pub mod cache;
pub mod dashboard;
pub mod export;
pub mod forecast;
pub mod health;
pub mod insights;
pub mod states;
pub mod trends;
