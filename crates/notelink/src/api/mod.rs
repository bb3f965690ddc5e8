pub mod backlinks;
pub mod error;
pub mod get_links;
pub mod notes;
pub mod router;
pub mod wikilinks;

pub use error::ApiError;
pub use router::api_routes;
