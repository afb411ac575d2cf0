pub mod analysis;
pub mod api;
pub mod error;
pub mod events;
pub mod finder;
pub mod recipes;
