//! Fehlertypen fuer Kurier
//!
//! Zentraler Fehler-Enum der alle moeglichen Fehlerzustaende abdeckt.
//! Untermodule koennen eigene Fehler definieren und via `#[from]` konvertieren.

use thiserror::Error;

/// Globaler Result-Alias fuer Kurier
pub type Result<T> = std::result::Result<T, KurierFehler>;

/// Alle moeglichen Fehler im Kurier-System
#[derive(Debug, Error)]
pub enum KurierFehler {
    // --- Transport & Netzwerk ---
    #[error("Transportfehler: {0}")]
    Transport(String),

    #[error("Kanalfehler: {0}")]
    Kanal(String),

    // --- Session ---
    #[error("Session nicht gefunden: {0}")]
    SessionNichtGefunden(String),

    #[error("Session-Aufbau fehlgeschlagen: {0}")]
    SessionAufbau(String),

    // --- Authentifizierung ---
    #[error("Authentifizierung fehlgeschlagen: {0}")]
    Authentifizierung(String),

    // --- Protokoll ---
    #[error("Ungueltige Nachricht: {0}")]
    UngueltigeNachricht(String),

    #[error("Protokoll nicht registriert: {0}")]
    ProtokollUnbekannt(String),

    // --- Konfiguration ---
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    // --- Senke ---
    #[error("Nachrichtensenke nicht erreichbar: {0}")]
    Senke(String),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl KurierFehler {
    /// Erstellt einen internen Fehler aus einer beliebigen Nachricht
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    /// Gibt true zurueck wenn der Fehler die Session beenden muss
    pub fn ist_fatal(&self) -> bool {
        matches!(
            self,
            Self::Authentifizierung(_) | Self::Transport(_) | Self::Kanal(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        let e = KurierFehler::Authentifizierung("Token abgelaufen".into());
        assert_eq!(
            e.to_string(),
            "Authentifizierung fehlgeschlagen: Token abgelaufen"
        );
    }

    #[test]
    fn fatal_erkennung() {
        assert!(KurierFehler::Authentifizierung("x".into()).ist_fatal());
        assert!(KurierFehler::Transport("x".into()).ist_fatal());
        assert!(!KurierFehler::UngueltigeNachricht("x".into()).ist_fatal());
    }
}
