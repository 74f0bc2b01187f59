//! Fehlertypen der Adapter-Schicht
//!
//! Die Fatal-Taxonomie steuert den Session-Abbau: Dekodierfehler einer
//! einzelnen Nachricht beenden die Session nicht, Authentifizierungs-
//! und Transportfehler immer.

use thiserror::Error;

/// Alle moeglichen Fehler eines Protokoll-Adapters
#[derive(Debug, Error)]
pub enum AdapterFehler {
    /// Einzelne Nachricht nicht dekodierbar (nicht fatal)
    #[error("Dekodierung fehlgeschlagen: {0}")]
    Dekodierung(String),

    /// Gegenstelle nicht authentifiziert oder Token ungueltig (fatal)
    #[error("Authentifizierung fehlgeschlagen: {0}")]
    Authentifizierung(String),

    /// Protokollablauf verletzt, z.B. Nachricht vor dem Handshake (fatal)
    #[error("Protokollverletzung: {0}")]
    Protokollverletzung(String),

    /// Unbehebbarer Transportfehler auf dem Kanal (fatal)
    #[error("Transportfehler: {0}")]
    Transport(String),

    /// Nachrichtensenke hat die Zustellung abgelehnt (nicht fatal)
    #[error("Senke nicht erreichbar: {0}")]
    Senke(String),

    /// Kein Konstruktor fuer den Protokollnamen registriert
    #[error("Protokoll nicht registriert: {0}")]
    ProtokollUnbekannt(String),

    /// `init` wurde mehr als einmal aufgerufen
    #[error("Adapter bereits initialisiert")]
    BereitsInitialisiert,
}

impl AdapterFehler {
    /// True wenn der Fehler die Session beenden muss
    pub fn ist_fatal(&self) -> bool {
        !matches!(self, Self::Dekodierung(_) | Self::Senke(_))
    }
}
