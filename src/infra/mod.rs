pub mod factory;
pub mod push;
pub mod repositories;
