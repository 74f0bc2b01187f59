//! kurier-gateway – Session-Demultiplexer und Datagramm-Listener
//!
//! Ein einzelner Empfangs-Loop nimmt Datagramme vieler Gegenstellen auf
//! einem Socket entgegen und faechert sie in logische Sessions auf
//! (eine pro Peer-Adresse). Jede Session besitzt einen Protokoll-
//! Adapter, einen Kanal und einen eigenen Abbruch-Scope und wird –
//! egal welcher Pfad den Abbau ausloest – genau einmal abgebaut.
//!
//! ## Module
//! - [`session`] – Session-Cache: Vorwaerts- und Rueckwaerts-Tabelle
//!   unter EINEM Lock
//! - [`listener`] – Der `GatewayListener` mit Empfangs-Loop und
//!   Abbau-Protokoll
//! - [`error`] – Fehlertypen

pub mod error;
pub mod listener;
pub mod session;

pub use error::GatewayFehler;
pub use listener::{GatewayListener, ListenerFehlerMeldung, ListenerKonfiguration};
pub use session::{SessionCache, SessionEintrag};
