//! Der `Kanal`-Trait – Vertrag fuer alle Transport-Bindungen
//!
//! Ein Kanal gehoert genau einem Protokoll-Adapter. Der Adapter steuert
//! Zustandsuebergaenge und Flags, die Transportschicht liefert
//! eingehende Bytes ueber `nachricht_einreihen` an.

use async_trait::async_trait;
use kurier_core::types::KanalId;
use thiserror::Error;

use crate::ereignis::KanalEreignisse;
use crate::zustand::KanalZustand;

/// Fehler der Kanal-Schicht
#[derive(Debug, Error)]
pub enum KanalFehler {
    #[error("Kanal {0} ist nicht verbunden")]
    NichtVerbunden(KanalId),

    #[error("Kanal {0} ist geschlossen")]
    Geschlossen(KanalId),

    #[error("Ungueltiger Zustandsuebergang: {von} -> {nach}")]
    UngueltigerUebergang {
        von: KanalZustand,
        nach: KanalZustand,
    },

    #[error("Transportfehler: {0}")]
    Transport(#[from] std::io::Error),
}

/// Bidirektionaler Nachrichten-Endpunkt mit Lebenszyklus
///
/// Vertragsdetails:
/// - `oeffnen` und `schliessen` sind idempotent
/// - `nachricht_einreihen` und `empfangen` bilden eine FIFO-Queue:
///   Nachrichten kommen in Einreihe-Reihenfolge beim Konsumenten an
/// - Ereignisse werden Fire-and-Forget gemeldet, ein Kanal wartet nie
///   auf seine Beobachter
#[async_trait]
pub trait Kanal: Send + Sync {
    /// Stabile, eindeutige Kennung des Kanals
    fn id(&self) -> KanalId;

    /// Transport-Port des Gegenueber
    fn port(&self) -> u16;

    /// Aktueller Lebenszyklus-Zustand
    fn zustand(&self) -> KanalZustand;

    /// True wenn Nachrichten fliessen koennen
    fn ist_verbunden(&self) -> bool;

    /// True wenn der Transport verschluesselt ist
    fn ist_verschluesselt(&self) -> bool;

    /// True wenn der besitzende Adapter die Gegenstelle authentifiziert hat
    fn ist_authentifiziert(&self) -> bool;

    /// Setzt das Authentifizierungs-Flag (nur der besitzende Adapter)
    fn authentifiziert_setzen(&self, wert: bool);

    /// Zugriff auf die Ereignis-Kanaele
    fn ereignisse(&self) -> &KanalEreignisse;

    /// Bereitet den Transport vor: Geschlossen -> Oeffnet -> Offen
    ///
    /// No-op wenn bereits offen.
    async fn oeffnen(&self) -> Result<(), KanalFehler>;

    /// Sendet eine ausgehende Nachricht
    ///
    /// Schlaegt mit `NichtVerbunden` fehl wenn der Kanal nicht offen
    /// ist. Blockiert nur fuer Transport-Backpressure.
    async fn senden(&self, nachricht: &[u8]) -> Result<(), KanalFehler>;

    /// Reiht ein empfangenes Datagramm in die Eingangs-Queue ein
    ///
    /// Gelingt immer solange der Kanal offen ist, sonst `Geschlossen`.
    async fn nachricht_einreihen(&self, nachricht: Vec<u8>) -> Result<(), KanalFehler>;

    /// Wartet kooperativ auf die naechste eingereihte Nachricht
    ///
    /// Gibt `None` zurueck sobald der Kanal geschlossen wurde.
    async fn empfangen(&self) -> Option<Vec<u8>>;

    /// Sauberer Abbau: Offen -> Schliesst -> Geschlossen
    ///
    /// No-op wenn bereits geschlossen.
    async fn schliessen(&self) -> Result<(), KanalFehler>;

    /// Meldet einen unbehebbaren Transportfehler: -> Gestoert -> Geschlossen
    async fn stoeren(&self, grund: &str);
}
