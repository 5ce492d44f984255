/// Data layer: pulsar datasets, MCMC chains, loading and filtering.
///
/// Architecture:
/// ```text
///  chain_1.txt / .csv / .json / .parquet      pulsar .json
///        │                                        │
///        ▼                                        ▼
///   ┌──────────┐                            ┌──────────┐
///   │  loader   │  parse file → Chain       │  loader   │  → Pulsar
///   └──────────┘                            └──────────┘
///        │                                        │
///        ▼                                        ▼
///   ┌──────────────┐                      ┌──────────────┐
///   │ PostProcessing│  burn-in, plots      │    filter     │  cadence / mask → Pulsar
///   └──────────────┘                      └──────────────┘
/// ```

pub mod chain;
pub mod filter;
pub mod loader;
pub mod pulsar;

pub use chain::{Chain, DEFAULT_BURN_FRACTION};
pub use filter::{cadence_filter, cadence_mask, get_tspan, mask_filter, CadenceOptions};
pub use pulsar::{Pulsar, PulsarRecord, Selection};
