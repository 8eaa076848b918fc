pub mod cards;
pub mod catalog;
pub mod deals;
pub mod health;
pub mod insights;
pub mod ledger;
pub mod profile;
pub mod recommendations;
pub mod snapshot;
pub mod spending;
