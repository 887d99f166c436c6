pub mod node;
pub mod property_bag;
pub mod target;
