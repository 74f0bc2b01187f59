//! Der `ProtokollAdapter`-Trait – Vertrag aller Protokoll-Bindungen
//!
//! Ein Adapter ist fuer seine gesamte Lebensdauer an genau einen Kanal
//! gebunden und wird nie fuer eine andere Gegenstelle wiederverwendet.

use async_trait::async_trait;
use kurier_channel::Kanal;
use std::sync::Arc;

use crate::error::AdapterFehler;

/// Bindet einen Kanal an ein Wire-Protokoll und eine Authentifizierung
///
/// Vertragsdetails:
/// - `init` genau einmal, nach dem Kanal-Oeffnen und vor dem ersten
///   eingehenden Byte; ein zweiter Aufruf ist ein Vertragsbruch
/// - vor erfolgreicher Authentifizierung erreicht keine dekodierte
///   Anwendungsnachricht die Senke
/// - pro Session wird genau ein Terminal-Ereignis (`Geschlossen`)
///   gemeldet
/// - `entsorgen` ist idempotent und schliesst den eigenen Kanal
#[async_trait]
pub trait ProtokollAdapter: Send + Sync {
    /// Der exklusiv besessene Kanal
    fn kanal(&self) -> Arc<dyn Kanal>;

    /// Einmalige Initialisierung; startet die Verarbeitungs-Schleife
    fn init(&self) -> Result<(), AdapterFehler>;

    /// Gibt Adapter-Ressourcen frei und schliesst den Kanal
    async fn entsorgen(&self);
}
