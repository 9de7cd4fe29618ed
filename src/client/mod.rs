/// Pub/sub client: subscription registry + reconnect orchestrator
mod ps_client;

pub use ps_client::PsClient;
