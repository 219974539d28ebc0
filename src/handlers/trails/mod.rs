// handlers/trails/mod.rs - Trail resource handlers
//
// Public:    GET /api/trails, GET /api/trails/:name
// Protected: POST /api/trails, PUT /api/trails/:name, DELETE /api/trails/:name
//            (Credentials in the JSON body, checked by require_credentials)

pub mod create;
pub mod delete;
pub mod list;
pub mod read;
pub mod update;

pub use create::trail_create;
pub use delete::trail_delete;
pub use list::trail_list;
pub use read::trail_read;
pub use update::trail_update;
