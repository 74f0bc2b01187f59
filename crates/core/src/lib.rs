//! kurier-core – Gemeinsame Typen, Traits und Fehlertypen
//!
//! Dieses Crate stellt die fundamentalen Bausteine bereit, die von allen
//! anderen Kurier-Crates gemeinsam genutzt werden.

pub mod error;
pub mod senke;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use error::{KurierFehler, Result};
pub use senke::{Nachrichtensenke, ProtokollSenke};
pub use types::{KanalId, RessourcenId, SessionSchluessel};
