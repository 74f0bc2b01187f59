//! kurier-auth – Authentifikator-Capability
//!
//! Validiert eingehende Sicherheits-Token und liefert die
//! authentifizierte Identitaet samt Anspruechen. Konfiguriert wird pro
//! Token-Art genau ein Tripel aus symmetrischem Schluessel, Aussteller
//! und Zielgruppe.
//!
//! ## Module
//! - [`anspruch`] – Anspruchs-Paare (Typ/Wert)
//! - [`token`] – Token-Format, Ausstellung und Pruefung (HMAC-SHA256)
//! - [`authentifikator`] – Der `Authentifikator`-Trait und die
//!   Basis-Implementierung
//! - [`error`] – Fehlertypen

pub mod anspruch;
pub mod authentifikator;
pub mod error;
pub mod token;

pub use anspruch::Anspruch;
pub use authentifikator::{AuthErgebnis, Authentifikator, BasisAuthentifikator};
pub use error::{AuthFehler, AuthResult};
pub use token::{token_ausstellen, TokenArt};
