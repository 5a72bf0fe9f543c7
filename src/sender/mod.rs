pub mod client;
pub mod envelope;
pub mod tls;

pub use client::{COLLECTOR_PATH, ClientError, HecClient, SendError, TransportConfig};
pub use envelope::HecEnvelope;
pub use tls::{TlsError, TlsMode};
