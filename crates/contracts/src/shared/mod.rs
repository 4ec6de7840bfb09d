pub mod global;
pub mod tree;
