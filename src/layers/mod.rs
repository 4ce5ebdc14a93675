#[macro_use]
pub mod macros;

pub mod base;
pub mod basemap;
pub mod manager;
pub mod overlay;
pub mod tile;
pub mod vector;
