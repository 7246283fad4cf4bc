pub mod app;
pub mod config;
pub mod errors;
pub mod fill;
pub mod goal;
pub mod handlers;
pub mod models;
pub mod reminder;
pub mod remote;
pub mod series;
pub mod state;
pub mod stats;
pub mod storage;
pub mod store;

pub use app::router;
pub use config::{ClientConfig, ServerConfig};
pub use fill::{FillModel, derive_fill};
pub use goal::validate_goal;
pub use remote::{HttpRemote, HydrationRemote, RemoteError};
pub use state::AppState;
pub use stats::{WeeklySummary, summarize};
pub use storage::load_data;
pub use store::{HydrationStore, StoreError};
