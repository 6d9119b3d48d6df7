mod config;
mod ingest;
mod init;
mod search;
mod status;

pub use config::ConfigCommand;
pub use ingest::IngestArgs;
pub use init::InitArgs;
pub use search::SearchArgs;

pub use config::handle_config;
pub use ingest::handle_ingest;
pub use init::handle_init;
pub use search::handle_search;
pub use status::handle_status;
