pub mod nutrition;
pub mod safety;
