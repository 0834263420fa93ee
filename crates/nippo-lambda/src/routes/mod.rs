pub mod events;
pub mod exports;
pub mod health;
pub mod reports;
