//! Rahmen-Definitionen des Basis-Protokolls
//!
//! ## Design
//! - Ein UDP-Datagramm transportiert genau einen Rahmen
//! - JSON-Serialisierung via serde (Steuerverkehr, nicht zeitkritisch)
//! - Tagged Enums fuer typsichere Nachrichtentypen
//!
//! Der Verbindungsaufbau ist zustandsbehaftet: der erste Rahmen einer
//! Session MUSS `Verbinden` sein; alles weitere wird vom Adapter erst
//! nach erfolgreicher Authentifizierung akzeptiert.

use kurier_core::types::RessourcenId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Fehler-Codes
// ---------------------------------------------------------------------------

/// Standardisierte Fehler-Codes fuer Fehler-Rahmen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FehlerCode {
    // Allgemein
    InternalError,
    InvalidFrame,
    // Auth
    NotAuthenticated,
    InvalidCredentials,
    // Protokoll
    UnsupportedVersion,
}

// ---------------------------------------------------------------------------
// GatewayRahmen
// ---------------------------------------------------------------------------

/// Alle Rahmen des Basis-Protokolls
///
/// Eingehend (Client -> Gateway): `Verbinden`, `Veroeffentlichen`,
/// `Ping`, `Trennen`. Ausgehend: `VerbindenBestaetigt`, `Bestaetigung`,
/// `Fehler`, `Pong`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "art", rename_all = "snake_case")]
pub enum GatewayRahmen {
    /// Verbindungsaufbau mit Sicherheits-Token (erster Rahmen)
    Verbinden {
        /// Sicherheits-Token (Format haengt von der Token-Art ab)
        token: String,
    },
    /// Bestaetigung des Verbindungsaufbaus
    VerbindenBestaetigt {
        /// Authentifizierte Identitaet
        identitaet: String,
    },
    /// Anwendungsnachricht an eine Ressource
    Veroeffentlichen {
        /// Ziel-Ressource (opaque URI)
        ressource: RessourcenId,
        /// Laufende Sequenznummer des Absenders
        sequenz: u32,
        /// Rohe Nutzdaten
        nutzdaten: Vec<u8>,
    },
    /// Empfangsbestaetigung fuer eine Veroeffentlichung
    Bestaetigung { sequenz: u32 },
    /// Fehler-Rahmen an den Client
    Fehler {
        code: FehlerCode,
        nachricht: String,
    },
    /// Sauberer Verbindungsabbau durch den Client
    Trennen { grund: Option<String> },
    /// Keepalive-Anfrage
    Ping { zeitstempel: u64 },
    /// Keepalive-Antwort
    Pong { zeitstempel: u64 },
}

impl GatewayRahmen {
    /// Kurzform: Fehler-Rahmen bauen
    pub fn fehler(code: FehlerCode, nachricht: impl Into<String>) -> Self {
        Self::Fehler {
            code,
            nachricht: nachricht.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rahmen_ist_serde_kompatibel() {
        let rahmen = GatewayRahmen::Veroeffentlichen {
            ressource: RessourcenId::neu("kurier/sensor/1"),
            sequenz: 7,
            nutzdaten: vec![0xAB, 0xCD],
        };
        let json = serde_json::to_string(&rahmen).unwrap();
        assert!(json.contains("\"art\":\"veroeffentlichen\""));
        let zurueck: GatewayRahmen = serde_json::from_str(&json).unwrap();
        match zurueck {
            GatewayRahmen::Veroeffentlichen {
                ressource, sequenz, ..
            } => {
                assert_eq!(ressource.als_str(), "kurier/sensor/1");
                assert_eq!(sequenz, 7);
            }
            _ => panic!("Erwartet Veroeffentlichen"),
        }
    }

    #[test]
    fn fehler_code_screaming_snake() {
        let json = serde_json::to_string(&FehlerCode::InvalidCredentials).unwrap();
        assert_eq!(json, "\"INVALID_CREDENTIALS\"");
    }

    #[test]
    fn fehler_kurzform() {
        let rahmen = GatewayRahmen::fehler(FehlerCode::InvalidFrame, "kaputt");
        match rahmen {
            GatewayRahmen::Fehler { code, nachricht } => {
                assert_eq!(code, FehlerCode::InvalidFrame);
                assert_eq!(nachricht, "kaputt");
            }
            _ => panic!("Erwartet Fehler-Rahmen"),
        }
    }
}
