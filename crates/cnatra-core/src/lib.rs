//! Core library for retrieving published CNATRA squadron flight schedules.

pub mod config;
pub mod date_codec;
pub mod error;
pub mod logging;
pub mod page_state;
pub mod parser;
pub mod session;
pub mod store;
pub mod sweep;
pub mod transport;

pub use config::{
    ConfigLoadResult, ConfigSource, ScraperConfig, config_directory, config_path, load_config,
    save_config,
};
pub use date_codec::{DateNumber, front_page_url};
pub use error::{ConfigError, ScheduleError, StoreError, TransportError};
pub use page_state::{PageState, PostbackRequest};
pub use parser::{ScheduleBatchResult, ScheduleEntry, ScheduleOutcome};
pub use session::{DateStep, ScheduleSession};
pub use store::{JsonFileStore, ScheduleStore, SquadronDates};
pub use sweep::{SquadronOutcome, SquadronReport, SweepReport, run_sweep};
pub use transport::{HttpTransport, Transport};
