//! kurier-protocol – Wire-Format des Kurier Basis-Protokolls
//!
//! Definiert die Datagramm-Rahmen des first-party Gateway-Protokolls
//! ("basis"). Andere Protokolle (CoAP, MQTT, ...) binden sich ueber
//! eigene Adapter an und bringen ihr eigenes Wire-Format mit.
//!
//! ## Module
//! - [`rahmen`] – Rahmen-Definitionen (tagged Enum, JSON-Payload)
//! - [`wire`] – Kodierung: 1 Datagramm = 1 Rahmen, Magic + Version + JSON

pub mod rahmen;
pub mod wire;

pub use rahmen::{FehlerCode, GatewayRahmen};
pub use wire::{dekodieren, kodieren, RahmenFehler, DEFAULT_MAX_DATAGRAMM};
