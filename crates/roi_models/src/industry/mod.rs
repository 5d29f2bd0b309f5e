//! Industry model registry.
//!
//! Industries and company sizes are closed variant sets
//! ([`Industry`], [`CompanySize`]); free-form tags are parsed once at the
//! edge and the registry returns a plain [`IndustryProfile`] record.

mod registry;
mod tags;

pub use registry::{IndustryBenchmark, IndustryProfile, IndustryRegistry};
pub use tags::{CompanySize, Industry, UnknownTag};
