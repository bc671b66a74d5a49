//! Value Objects - Immutable, identity-less domain primitives

mod coordinate;
mod place_name;
mod proxy_template;
mod search_radius;

pub use coordinate::Coordinate;
pub use place_name::PlaceName;
pub use proxy_template::{ProxyTemplate, URL_PLACEHOLDER, rewrite_url};
pub use search_radius::SearchRadius;
