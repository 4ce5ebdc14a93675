pub mod earthquake;
pub mod feeds;
pub mod geojson;
