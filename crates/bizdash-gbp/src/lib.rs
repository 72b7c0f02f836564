pub mod aggregator;
pub mod client;
pub mod diagnostics;
pub mod error;
pub mod metrics;

pub use aggregator::*;
pub use client::*;
pub use diagnostics::*;
pub use error::*;
pub use metrics::*;
