//! kurier-adapter – Protokoll-Adapter fuer Kurier
//!
//! Ein Protokoll-Adapter besitzt genau einen Kanal, authentifiziert die
//! Gegenstelle vor der ersten Anwendungsnachricht und uebersetzt
//! zwischen Wire-Bytes und der Nachrichtensenke. Neue Protokolle
//! registrieren sich in der [`registratur::AdapterRegistratur`] ohne
//! Aenderungen am Erzeugungs-Pfad.
//!
//! ## Module
//! - [`adapter`] – Der `ProtokollAdapter`-Trait
//! - [`ereignis`] – Aufwaerts-Ereignisse (Fehler/Geschlossen), genau
//!   ein Terminal-Ereignis pro Session
//! - [`registratur`] – Protokollname -> Konstruktor
//! - [`basis`] – Adapter fuer das first-party Basis-Protokoll
//! - [`error`] – Fehlertypen mit Fatal-Taxonomie

pub mod adapter;
pub mod basis;
pub mod ereignis;
pub mod error;
pub mod registratur;

pub use adapter::ProtokollAdapter;
pub use basis::BasisAdapter;
pub use ereignis::{AdapterEreignis, AdapterEreignisse};
pub use error::AdapterFehler;
pub use registratur::{AdapterErzeugnis, AdapterKonstruktor, AdapterKontext, AdapterRegistratur};
