//! Fehlertypen fuer den Identitaets-Speicher

use thiserror::Error;

/// Alle moeglichen Fehler im Identitaets-Speicher
#[derive(Debug, Error)]
pub enum IdentitaetsFehler {
    #[error("Zertifikat nicht lesbar: {0}")]
    ZertifikatUnlesbar(String),

    #[error("Persistenz fehlgeschlagen: {0}")]
    Persistenz(#[from] std::io::Error),

    #[error("Persistierter Zustand ungueltig: {0}")]
    ZustandUngueltig(#[from] serde_json::Error),
}

/// Result-Alias fuer den Identitaets-Speicher
pub type IdentitaetsResult<T> = Result<T, IdentitaetsFehler>;
