//! Clients for services vidwiki talks to over the network.

pub mod generation_client;

pub use generation_client::RemoteGenerationBackend;
