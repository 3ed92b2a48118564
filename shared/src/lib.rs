pub mod auth;
pub mod carousel;
pub mod error;
pub mod geocode;
pub mod location;
pub mod map_slots;
pub mod recommendation;
pub mod search;
pub mod status;

pub use carousel::{Carousel, Navigation};
pub use error::MatjipError;
pub use geocode::GeocodeResponse;
pub use location::{BoundingBox, Coordinates, LocationHub, Subscription};
pub use map_slots::{ActivationPlan, MapSlots, SlotTicket};
pub use recommendation::RecommendationPool;
pub use search::{BodyEncoding, ResponseKind, ResultItem, SearchPayload, SearchResponse};
pub use status::StatusRotation;
