// Service exports
pub mod catalog;
pub mod geocoder;
pub mod memory;

pub use catalog::{CatalogError, CatalogFilter, CatalogStore, DocumentStoreClient, NearbyQuery};
pub use geocoder::{GeocodeError, Geocoder, NominatimGeocoder, StaticGeocoder};
pub use memory::MemoryCatalog;
