pub mod asset_index;

pub use asset_index::{download_asset_objects, AssetIndex, AssetObject, DEFAULT_RESOURCES_URL};
