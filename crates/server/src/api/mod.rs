mod routes;
mod scenario;

pub use routes::*;
pub use scenario::*;
