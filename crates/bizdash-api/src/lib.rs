pub mod error;
pub mod handlers;
pub mod org_handlers;
pub mod routes;
pub mod server;
pub mod session;
pub mod state;
pub mod upload;

pub use error::*;
pub use routes::*;
pub use server::*;
pub use state::*;
