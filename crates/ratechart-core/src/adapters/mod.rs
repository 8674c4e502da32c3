//! Rate source adapters.
//!
//! | Adapter | Upstream |
//! |---------|----------|
//! | [`CbrAdapter`] | Central Bank of Russia daily JSON archive |
//! | [`SyntheticSource`] | Deterministic offline rates |

pub mod cbr;
pub mod synthetic;

pub use cbr::{CbrAdapter, CbrConfig, CBR_URL_ENV, DEFAULT_CBR_URL};
pub use synthetic::SyntheticSource;
