//! kurier-identity – Dienst-Identitaets-Speicher
//!
//! Haelt pro Identitaet einen Satz Ansprueche und optional ein
//! Zertifikat. Erstzugriff initialisiert eine Identitaet explizit und
//! idempotent aus der Umgebung (Anspruchs-Listen, Zertifikats-
//! Verzeichnis + Fingerabdruck); bei Deaktivierung wird der Speicher
//! persistiert.
//!
//! ## Module
//! - [`speicher`] – Der `IdentitaetsSpeicher` mit ensure-initialized
//! - [`zertifikat`] – PEM-Laden und Fingerabdruck-Normalisierung
//! - [`error`] – Fehlertypen

pub mod error;
pub mod speicher;
pub mod zertifikat;

pub use error::{IdentitaetsFehler, IdentitaetsResult};
pub use speicher::{IdentitaetsSpeicher, IdentitaetsUmgebung};
pub use zertifikat::{fingerabdruck_berechnen, fingerabdruck_normalisieren};
