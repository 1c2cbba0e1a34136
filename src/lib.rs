pub mod access;
pub mod cache;
pub mod cli;
pub mod config;
pub mod detail;
pub mod error;
pub mod fingerprint;
pub mod format;
pub mod logging;
pub mod presentation;
pub mod registry;
pub mod scan;
pub mod server;
pub mod state;
pub mod store;
pub mod summary;
pub mod tools;
pub mod types;

pub use access::AccessGuard;
pub use detail::{DetailPayload, DetailRequest, DetailResponse, get_details};
pub use error::{DetailError, RegistryError, Result, StoreError};
pub use registry::{ManifestRegistry, ModuleMap, ModuleMeta, RegistryProvider, StaticRegistry};
pub use scan::{MatchMode, OccurrenceScanner, UsageIndex};
pub use state::TrackerState;
pub use store::{DirectoryStore, DocumentStore, MemoryStore};
pub use summary::{SummaryPage, SummaryQuery, UsageTier, build_summary};
pub use types::{Document, DocumentId, DocumentKind, DocumentStatus, ModuleId, PageDetail, UsageRecord};
