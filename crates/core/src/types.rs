//! Gemeinsame Identifikationstypen fuer Kurier
//!
//! Alle IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! verschiedenen ID-Arten zur Compilezeit auszuschliessen.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use uuid::Uuid;

/// Eindeutige Kanal-ID
///
/// Wird bei der Kanal-Erzeugung vergeben und bleibt fuer die gesamte
/// Lebensdauer des Kanals stabil. Solange eine Session den Kanal
/// referenziert, wird die ID nicht wiederverwendet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KanalId(pub Uuid);

impl KanalId {
    /// Erstellt eine neue zufaellige KanalId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for KanalId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for KanalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "kanal:{}", self.0)
    }
}

/// Session-Schluessel – deterministisch aus der Peer-Adresse abgeleitet
///
/// Format: `"<ip>:<port>"`. Zwei Datagramme vom selben Endpunkt landen
/// damit immer in derselben Session. NAT-Rebinding erzeugt bewusst eine
/// neue Session (akzeptierter Trade-off, siehe DESIGN.md).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionSchluessel(pub String);

impl SessionSchluessel {
    /// Leitet den Schluessel aus einem Socket-Endpunkt ab
    pub fn von_endpunkt(endpunkt: &SocketAddr) -> Self {
        Self(format!("{}:{}", endpunkt.ip(), endpunkt.port()))
    }

    /// Gibt den Schluessel als &str zurueck
    pub fn als_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionSchluessel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ressourcen-ID fuer Publish-Ziele
///
/// Opaque aus Sicht des Gateways – das Routing uebernimmt die externe
/// Nachrichtensenke.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RessourcenId(pub String);

impl RessourcenId {
    pub fn neu(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn als_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RessourcenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RessourcenId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RessourcenId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
