pub mod chef;

pub use chef::ChefAssistant;
