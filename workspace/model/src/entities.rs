//! SeaORM entities backing the WLA dataset.
//!
//! The store holds one flat table of monthly observations. Values arrive from
//! spreadsheet imports, so the raw columns are kept loose (free-text labels,
//! nullable numeric) and cleaned by the loader in the compute crate.

pub mod master_data;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::master_data::Entity as MasterData;
}
