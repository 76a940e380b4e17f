pub mod binding;
pub mod control;
pub mod fetch;
pub mod graph;
pub mod project;
