//! # postal-screen
//!
//! Address resolution and scoring for entity screening.
//!
//! The crate has two halves that share the [`Address`] shape:
//!
//! - **Parsing**: [`ParsingWorkerPool`] supervises a set of external libpostal
//!   worker processes, gates startup on their health checks, spreads parse
//!   calls across them and tears them down without leaking processes.
//! - **Scoring**: [`AddressScorer`] compares two structured addresses and
//!   returns a deterministic similarity in `[0, 1]` used to rank search
//!   candidates.
//!
//! ## Features
//!
//! - `pool` (default): the worker pool, built on tokio and reqwest
//! - `parallel`: batch scoring on rayon's thread pool
//!
//! ## Quick Start
//!
//! ```rust
//! use postal_screen::{Address, compare};
//!
//! let query = Address::new()
//!     .with_line1("123 Main Street")
//!     .with_city("Boston")
//!     .with_country("United States");
//! let candidate = Address::new()
//!     .with_line1("123 Main St")
//!     .with_city("Boston")
//!     .with_postal_code("02108")
//!     .with_country("US");
//!
//! let score = compare(&query, &candidate);
//! assert!(score > 0.95 && score < 1.0);
//! ```
//!
//! Parsing free text first:
//!
//! ```rust,no_run
//! use postal_screen::{CallContext, ParsingWorkerPool, PoolConfig, compare};
//!
//! # async fn run() -> postal_screen::Result<()> {
//! let pool = ParsingWorkerPool::new(PoolConfig::builder().instances(2).build()).await?;
//! let ctx = CallContext::background();
//!
//! let query = pool.parse_address(&ctx, "123 Main St, Boston MA 02108").await?;
//! let candidate = pool.parse_address(&ctx, "123 Main Street, Boston, Massachusetts").await?;
//! println!("score: {:.3}", compare(&query, &candidate));
//!
//! pool.shutdown().await;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod country;
pub mod error;
pub mod normalizer;
pub mod parser;
#[cfg(feature = "pool")]
pub mod pool;
pub mod scorer;
mod serde_millis;
pub mod similarity;
pub mod types;

// Re-export main API
pub use config::{PoolConfig, PoolConfigBuilder, WorkerLocator};
pub use country::{CountryResolver, resolve_country};
pub use error::{CancelReason, Error, Result};
pub use normalizer::{FieldNormalizer, NormalizeOptions, canonicalize};
pub use parser::{AddressComponent, ParsedAddress};
#[cfg(feature = "pool")]
pub use pool::context::{CallContext, CancelHandle};
#[cfg(feature = "pool")]
pub use pool::{ParsingWorkerPool, PoolStats};
pub use scorer::{
    AddressScorer, BestMatch, FieldDescriptor, FieldTrace, LogSink, NoTrace, TraceSink,
    WriterSink, compare, compare_traced,
};
pub use similarity::{JaroWinkler, StringSimilarity, TokenJaroWinkler};
pub use types::*;
