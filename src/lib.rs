pub mod b_tree;

pub use b_tree::BTree;
