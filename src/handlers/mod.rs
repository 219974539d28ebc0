// handlers/mod.rs - HTTP handlers
//
// Public handlers take only State/Path/Query. Mutating trail handlers also
// take the AuthUser injected by middleware::require_credentials.

pub mod root;
pub mod trails;
