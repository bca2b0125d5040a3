pub mod handlers;
pub mod medical_record_handlers;
pub mod middleware;
pub mod owner_handlers;
pub mod pet_handlers;
pub mod routes;

pub use handlers::*;
pub use routes::*;
