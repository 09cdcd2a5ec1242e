mod config;
mod load;
mod status;
mod upload;

pub use config::ConfigCommand;
pub use load::LoadArgs;
pub use upload::UploadArgs;

pub use config::handle_config;
pub use load::handle_load;
pub use status::handle_status;
pub use upload::handle_upload;
