//! Nachrichtensenke – Schnittstelle zum Pub/Sub-Kern
//!
//! Das Gateway kennt das Routing nicht: dekodierte Anwendungsnachrichten
//! werden an eine extern bereitgestellte Senke uebergeben, adressiert
//! ueber eine Ressourcen-ID. Subscription-Matching, Leases und
//! Zustellung sind Sache der Senken-Implementierung.

use crate::error::Result;
use crate::types::RessourcenId;
use async_trait::async_trait;

/// Trait fuer die Nachrichtensenke
///
/// Platzhalter-Trait – die konkrete Implementierung (Pub/Sub-Graph,
/// Message Broker) wird extern bereitgestellt.
#[async_trait]
pub trait Nachrichtensenke: Send + Sync {
    /// Uebergibt eine dekodierte Anwendungsnachricht an das Routing
    ///
    /// `identitaet` ist die authentifizierte Identitaet des Absenders.
    async fn veroeffentlichen(
        &self,
        ressource: &RessourcenId,
        identitaet: &str,
        nutzdaten: Vec<u8>,
    ) -> Result<()>;
}

/// Protokollierende Senke – loggt jede Nachricht und verwirft sie
///
/// Dient als Standard-Verdrahtung solange kein Pub/Sub-Kern
/// angeschlossen ist, und als Pruefpunkt in Tests.
#[derive(Debug, Default)]
pub struct ProtokollSenke;

#[async_trait]
impl Nachrichtensenke for ProtokollSenke {
    async fn veroeffentlichen(
        &self,
        ressource: &RessourcenId,
        identitaet: &str,
        nutzdaten: Vec<u8>,
    ) -> Result<()> {
        tracing::info!(
            ressource = %ressource,
            identitaet = %identitaet,
            bytes = nutzdaten.len(),
            "Nachricht an Senke uebergeben"
        );
        Ok(())
    }
}
