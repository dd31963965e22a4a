pub mod catalog;
pub mod locations;
pub mod pagination;
