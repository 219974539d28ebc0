pub mod pagination;
pub mod trail_service;
pub mod validation;

pub use pagination::{Page, PageParams, PageRequest};
pub use trail_service::{TrailError, TrailService};
