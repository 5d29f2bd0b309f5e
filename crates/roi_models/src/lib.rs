//! # roi_models: Investment Models and Financial Calculator
//!
//! ## Layer 2 (Models) Role
//!
//! roi_models sits on top of roi_core and provides:
//! - `InvestmentParameters` with a validating builder (`investment`)
//! - Closed industry and company-size tags plus the benchmark registry (`industry`)
//! - The financial calculator: NPV, IRR, TCO, payback, risk-adjusted
//!   return, break-even (`calculator`)
//! - Parameter-to-metrics investment analysis (`analysis`)
//!
//! Everything here is synchronous and free of shared mutable state. The
//! registry is immutable after construction.
//!
//! ## Usage Examples
//!
//! ```rust
//! use roi_models::analysis::analyze_investment;
//! use roi_models::calculator::FinancialCalculator;
//! use roi_models::industry::IndustryRegistry;
//! use roi_models::investment::InvestmentParameters;
//!
//! let registry = IndustryRegistry::builtin();
//! let profile = registry.resolve("manufacturing", "large");
//!
//! let params = InvestmentParameters::builder()
//!     .annual_revenue(10_000_000.0)
//!     .initial_investment(750_000.0)
//!     .annual_costs(120_000.0)
//!     .timeline_periods(60)
//!     .industry(profile.industry)
//!     .company_size(profile.company_size)
//!     .build()
//!     .unwrap();
//!
//! let metrics = analyze_investment(&params, &profile, &FinancialCalculator::default(), 0.04).unwrap();
//! assert!(metrics.npv > 0.0);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod analysis;
pub mod calculator;
pub mod industry;
pub mod investment;
