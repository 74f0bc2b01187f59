//! kurier-channel – Kanal-Abstraktion fuer Kurier
//!
//! Ein Kanal ist ein bidirektionaler Nachrichten-Endpunkt mit expliziter
//! Zustandsmaschine und Ereignis-Benachrichtigungen. Protokoll-Adapter
//! konsumieren Kanaele, der Gateway-Listener befuellt sie mit
//! eingehenden Datagrammen.
//!
//! ## Module
//! - [`zustand`] – Zustandsmaschine (Geschlossen/Oeffnet/Offen/Schliesst/Gestoert)
//! - [`ereignis`] – Broadcast-Ereignisse pro Ereignisart
//! - [`kanal`] – Der `Kanal`-Trait und seine Fehlertypen
//! - [`udp`] – Konkrete UDP-Bindung ueber einen geteilten Socket

pub mod ereignis;
pub mod kanal;
pub mod udp;
pub mod zustand;

pub use ereignis::{KanalEreignisse, ZustandsWechsel};
pub use kanal::{Kanal, KanalFehler};
pub use udp::UdpKanal;
pub use zustand::KanalZustand;
