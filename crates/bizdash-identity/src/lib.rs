pub mod error;
pub mod org;
pub mod provider;
pub mod token;

pub use error::*;
pub use org::*;
pub use provider::*;
pub use token::*;
