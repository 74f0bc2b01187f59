//! Fehlertypen fuer den Authentifikator

use thiserror::Error;

use crate::token::TokenArt;

/// Alle moeglichen Fehler bei der Token-Validierung
#[derive(Debug, Error)]
pub enum AuthFehler {
    // --- Format ---
    #[error("Token-Format ungueltig: {0}")]
    FormatUngueltig(String),

    #[error("Token-Art unbekannt: {0}")]
    ArtUnbekannt(String),

    #[error("Token-Art nicht unterstuetzt: {0}")]
    ArtNichtUnterstuetzt(TokenArt),

    #[error("Keine Konfiguration fuer Token-Art: {0}")]
    ArtNichtKonfiguriert(TokenArt),

    // --- Pruefung ---
    #[error("Token-Signatur ungueltig")]
    SignaturUngueltig,

    #[error("Aussteller falsch: erwartet={erwartet}, erhalten={erhalten}")]
    AusstellerFalsch { erwartet: String, erhalten: String },

    #[error("Zielgruppe falsch: erwartet={erwartet}, erhalten={erhalten}")]
    ZielgruppeFalsch { erwartet: String, erhalten: String },

    #[error("Token abgelaufen")]
    Abgelaufen,
}

/// Result-Alias fuer den Authentifikator
pub type AuthResult<T> = Result<T, AuthFehler>;
