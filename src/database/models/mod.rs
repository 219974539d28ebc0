pub mod trail;
pub mod user;

pub use trail::{Location, NewLocation, NewPoint, NewTrail, Trail, TrailChanges, TrailPoint, TrailRecord};
pub use user::User;
