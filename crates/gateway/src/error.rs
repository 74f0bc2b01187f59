//! Fehlertypen der Gateway-Schicht

use kurier_adapter::AdapterFehler;
use kurier_channel::KanalFehler;
use thiserror::Error;

/// Alle moeglichen Fehler im Gateway-Listener
#[derive(Debug, Error)]
pub enum GatewayFehler {
    #[error("Socket-Fehler: {0}")]
    Socket(#[from] std::io::Error),

    #[error(transparent)]
    Adapter(#[from] AdapterFehler),

    #[error(transparent)]
    Kanal(#[from] KanalFehler),

    #[error("Session-Limit erreicht: {0} aktive Sessions")]
    SessionLimit(usize),
}
