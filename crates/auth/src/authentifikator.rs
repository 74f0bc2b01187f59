//! Authentifikator – Capability-Trait und Basis-Implementierung
//!
//! Der `BasisAuthentifikator` haelt pro Token-Art genau ein Tripel aus
//! symmetrischem Schluessel, Aussteller und Zielgruppe. Adapter
//! konsumieren die Capability, ohne die Pruef-Interna zu kennen.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::anspruch::Anspruch;
use crate::error::{AuthFehler, AuthResult};
use crate::token::{token_pruefen, TokenArt};

/// Ergebnis einer erfolgreichen Validierung
#[derive(Debug, Clone)]
pub struct AuthErgebnis {
    /// Authentifizierte Identitaet (Token-Subjekt)
    pub identitaet: String,
    /// Ansprueche der Identitaet
    pub ansprueche: Vec<Anspruch>,
}

/// Capability-Trait: validiert eingehende Sicherheits-Token
#[async_trait]
pub trait Authentifikator: Send + Sync {
    /// Prueft einen Token der gegebenen Art
    async fn validieren(&self, token: &[u8], art: TokenArt) -> AuthResult<AuthErgebnis>;
}

/// Konfiguration fuer eine Token-Art
#[derive(Debug, Clone)]
struct TokenKonfiguration {
    schluessel: String,
    aussteller: String,
    zielgruppe: String,
}

/// Basis-Authentifikator mit symmetrischen Schluesseln
#[derive(Debug, Default)]
pub struct BasisAuthentifikator {
    konfigurationen: HashMap<TokenArt, TokenKonfiguration>,
}

impl BasisAuthentifikator {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Hinterlegt das Pruef-Tripel fuer eine Token-Art
    pub fn hinzufuegen(
        &mut self,
        art: TokenArt,
        schluessel: impl Into<String>,
        aussteller: impl Into<String>,
        zielgruppe: impl Into<String>,
    ) {
        self.konfigurationen.insert(
            art,
            TokenKonfiguration {
                schluessel: schluessel.into(),
                aussteller: aussteller.into(),
                zielgruppe: zielgruppe.into(),
            },
        );
    }
}

#[async_trait]
impl Authentifikator for BasisAuthentifikator {
    async fn validieren(&self, token: &[u8], art: TokenArt) -> AuthResult<AuthErgebnis> {
        let konfig = self
            .konfigurationen
            .get(&art)
            .ok_or(AuthFehler::ArtNichtKonfiguriert(art))?;

        match art {
            TokenArt::Jwt => {
                let token_str = std::str::from_utf8(token)
                    .map_err(|_| AuthFehler::FormatUngueltig("Token ist kein UTF-8".into()))?;

                let inhalt = token_pruefen(
                    token_str,
                    &konfig.schluessel,
                    &konfig.aussteller,
                    &konfig.zielgruppe,
                )
                .map_err(|e| {
                    tracing::warn!(fehler = %e, "Token-Validierung fehlgeschlagen");
                    e
                })?;

                tracing::debug!(identitaet = %inhalt.sub, "Token validiert");
                Ok(AuthErgebnis {
                    identitaet: inhalt.sub,
                    ansprueche: inhalt.ansprueche,
                })
            }
            TokenArt::Swt | TokenArt::X509 => Err(AuthFehler::ArtNichtUnterstuetzt(art)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::token_ausstellen;

    const SCHLUESSEL: &str = "test-geheimnis";
    const AUSSTELLER: &str = "kurier-test";
    const ZIELGRUPPE: &str = "urn:kurier:gateway";

    fn authentifikator() -> BasisAuthentifikator {
        let mut a = BasisAuthentifikator::neu();
        a.hinzufuegen(TokenArt::Jwt, SCHLUESSEL, AUSSTELLER, ZIELGRUPPE);
        a
    }

    #[tokio::test]
    async fn gueltiger_token_liefert_identitaet() {
        let a = authentifikator();
        let token = token_ausstellen(
            SCHLUESSEL,
            AUSSTELLER,
            ZIELGRUPPE,
            "geraet-42",
            300,
            vec![Anspruch::neu("rolle", "sensor")],
        );

        let ergebnis = a.validieren(token.as_bytes(), TokenArt::Jwt).await.unwrap();
        assert_eq!(ergebnis.identitaet, "geraet-42");
        assert_eq!(ergebnis.ansprueche[0].typ, "rolle");
    }

    #[tokio::test]
    async fn unkonfigurierte_art_schlaegt_fehl() {
        let a = authentifikator();
        let ergebnis = a.validieren(b"egal", TokenArt::Swt).await;
        assert!(matches!(ergebnis, Err(AuthFehler::ArtNichtKonfiguriert(_))));
    }

    #[tokio::test]
    async fn nicht_unterstuetzte_art_schlaegt_fehl() {
        let mut a = BasisAuthentifikator::neu();
        a.hinzufuegen(TokenArt::X509, "k", "i", "z");
        let ergebnis = a.validieren(b"egal", TokenArt::X509).await;
        assert!(matches!(ergebnis, Err(AuthFehler::ArtNichtUnterstuetzt(_))));
    }

    #[tokio::test]
    async fn kaputter_token_schlaegt_fehl() {
        let a = authentifikator();
        let ergebnis = a.validieren(b"kein.echter.token", TokenArt::Jwt).await;
        assert!(ergebnis.is_err());
    }
}
