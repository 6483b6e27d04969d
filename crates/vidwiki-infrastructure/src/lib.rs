pub mod config_service;
pub mod dto;
pub mod google;
pub mod paths;
pub mod storage;
pub mod toml_session_repository;

pub use crate::config_service::ConfigService;
pub use crate::google::{GoogleAuth, GoogleDriveSink, GoogleSheetSink, google_sinks};
pub use crate::paths::VidwikiPaths;
pub use crate::toml_session_repository::TomlSessionRepository;
