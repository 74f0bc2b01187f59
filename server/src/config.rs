//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass das Gateway ohne Konfigurationsdatei
//! lauffaehig ist.

use serde::{Deserialize, Serialize};

/// Vollstaendige Gateway-Konfiguration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct GatewayKonfiguration {
    /// Allgemeine Server-Einstellungen
    pub server: ServerEinstellungen,
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Sicherheits-Einstellungen (Token-Pruefung)
    pub sicherheit: SicherheitsEinstellungen,
    /// Protokoll-Auswahl
    pub protokoll: ProtokollEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
    /// Identitaets-Speicher
    pub identitaet: IdentitaetsEinstellungen,
}

/// Allgemeine Server-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    /// Anzeigename des Gateways
    pub name: String,
    /// Maximale Anzahl gleichzeitiger Sessions
    pub max_sessions: usize,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            name: "Kurier Gateway".into(),
            max_sessions: 512,
        }
    }
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Bind-Adresse fuer den Datagramm-Socket
    pub bind_adresse: String,
    /// Port fuer den Datagramm-Socket
    pub udp_port: u16,
    /// Maximale Datagramm-Groesse in Bytes
    pub max_datagramm_bytes: usize,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            udp_port: 5683,
            max_datagramm_bytes: 1400,
        }
    }
}

/// Sicherheits-Einstellungen: ein Tripel pro Deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SicherheitsEinstellungen {
    /// Token-Art: "jwt", "swt" oder "x509"
    pub token_art: String,
    /// Symmetrischer Schluessel fuer die Signatur-Pruefung
    pub symmetrischer_schluessel: String,
    /// Erwarteter Aussteller
    pub aussteller: String,
    /// Erwartete Zielgruppe
    pub zielgruppe: String,
}

impl Default for SicherheitsEinstellungen {
    fn default() -> Self {
        Self {
            token_art: "jwt".into(),
            symmetrischer_schluessel: String::new(),
            aussteller: "kurier".into(),
            zielgruppe: "urn:kurier:gateway".into(),
        }
    }
}

/// Protokoll-Auswahl fuer den Listener
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtokollEinstellungen {
    /// Name des Adapters in der Registratur
    pub standard: String,
}

impl Default for ProtokollEinstellungen {
    fn default() -> Self {
        Self {
            standard: "basis".into(),
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// Identitaets-Speicher-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentitaetsEinstellungen {
    /// Persistenz-Pfad (leer = keine Persistenz)
    pub persistenz_pfad: Option<String>,
    /// Name der Dienst-Identitaet
    pub dienst_name: String,
}

impl Default for IdentitaetsEinstellungen {
    fn default() -> Self {
        Self {
            persistenz_pfad: None,
            dienst_name: "gateway".into(),
        }
    }
}

impl GatewayKonfiguration {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let konfig: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok(konfig)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Gibt die vollstaendige Bind-Adresse fuer den Datagramm-Socket zurueck
    pub fn udp_bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.udp_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_konfiguration_ist_valide() {
        let konfig = GatewayKonfiguration::default();
        assert_eq!(konfig.server.max_sessions, 512);
        assert_eq!(konfig.netzwerk.udp_port, 5683);
        assert_eq!(konfig.sicherheit.token_art, "jwt");
        assert_eq!(konfig.protokoll.standard, "basis");
        assert_eq!(konfig.logging.level, "info");
    }

    #[test]
    fn bind_adresse() {
        let konfig = GatewayKonfiguration::default();
        assert_eq!(konfig.udp_bind_adresse(), "0.0.0.0:5683");
    }

    #[test]
    fn konfiguration_aus_toml_string() {
        let toml = r#"
            [server]
            name = "Mein Gateway"
            max_sessions = 100

            [netzwerk]
            udp_port = 6000

            [sicherheit]
            symmetrischer_schluessel = "geheim"
            aussteller = "test-aussteller"
        "#;
        let konfig: GatewayKonfiguration = toml::from_str(toml).unwrap();
        assert_eq!(konfig.server.name, "Mein Gateway");
        assert_eq!(konfig.server.max_sessions, 100);
        assert_eq!(konfig.netzwerk.udp_port, 6000);
        assert_eq!(konfig.sicherheit.aussteller, "test-aussteller");
        // Nicht angegebene Felder behalten Standardwerte
        assert_eq!(konfig.netzwerk.bind_adresse, "0.0.0.0");
        assert_eq!(konfig.sicherheit.zielgruppe, "urn:kurier:gateway");
    }
}
