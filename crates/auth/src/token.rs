//! Token-Format: kompakte, HMAC-SHA256-signierte JSON-Web-Token
//!
//! ```text
//! base64url(header) . base64url(ansprueche) . base64url(signatur)
//! ```
//!
//! Die Signatur laeuft ueber die ersten beiden Segmente. Ausstellung
//! (`token_ausstellen`) existiert fuer Tests und Provisionierungs-Tools;
//! das Gateway selbst prueft nur.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ring::hmac;
use serde::{Deserialize, Serialize};

use crate::anspruch::Anspruch;
use crate::error::{AuthFehler, AuthResult};

// ---------------------------------------------------------------------------
// Token-Art
// ---------------------------------------------------------------------------

/// Unterstuetzte Token-Arten
///
/// Die Namen werden case-insensitiv aus der Konfiguration geparst.
/// Validiert wird derzeit nur `Jwt`; `Swt` und `X509` sind als
/// Konfigurationswerte erkannt, schlagen aber bei der Pruefung mit
/// `ArtNichtUnterstuetzt` fehl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenArt {
    Jwt,
    Swt,
    X509,
}

impl std::str::FromStr for TokenArt {
    type Err = AuthFehler;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jwt" => Ok(Self::Jwt),
            "swt" => Ok(Self::Swt),
            "x509" => Ok(Self::X509),
            _ => Err(AuthFehler::ArtUnbekannt(s.to_string())),
        }
    }
}

impl std::fmt::Display for TokenArt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Jwt => "jwt",
            Self::Swt => "swt",
            Self::X509 => "x509",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Token-Inhalt
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct TokenKopf {
    alg: String,
    typ: String,
}

/// Anspruchs-Segment eines Tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenAnsprueche {
    /// Aussteller
    pub iss: String,
    /// Zielgruppe
    pub aud: String,
    /// Subjekt (die Identitaet)
    pub sub: String,
    /// Ablauf als Unix-Zeitstempel (Sekunden)
    pub exp: i64,
    /// Zusaetzliche Anspruchs-Paare
    #[serde(default)]
    pub ansprueche: Vec<Anspruch>,
}

// ---------------------------------------------------------------------------
// Ausstellung und Pruefung
// ---------------------------------------------------------------------------

fn hmac_schluessel(schluessel: &str) -> hmac::Key {
    hmac::Key::new(hmac::HMAC_SHA256, schluessel.as_bytes())
}

/// Stellt einen signierten Token aus (Tests und Provisionierung)
pub fn token_ausstellen(
    schluessel: &str,
    aussteller: &str,
    zielgruppe: &str,
    subjekt: &str,
    gueltig_sekunden: i64,
    ansprueche: Vec<Anspruch>,
) -> String {
    let kopf = TokenKopf {
        alg: "HS256".into(),
        typ: "JWT".into(),
    };
    let inhalt = TokenAnsprueche {
        iss: aussteller.into(),
        aud: zielgruppe.into(),
        sub: subjekt.into(),
        exp: chrono::Utc::now().timestamp() + gueltig_sekunden,
        ansprueche,
    };

    let kopf_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&kopf).expect("Kopf serialisierbar"));
    let inhalt_b64 =
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&inhalt).expect("Inhalt serialisierbar"));

    let signier_eingabe = format!("{kopf_b64}.{inhalt_b64}");
    let signatur = hmac::sign(&hmac_schluessel(schluessel), signier_eingabe.as_bytes());
    let signatur_b64 = URL_SAFE_NO_PAD.encode(signatur.as_ref());

    format!("{signier_eingabe}.{signatur_b64}")
}

/// Prueft Signatur, Aussteller, Zielgruppe und Ablauf eines Tokens
///
/// Gibt bei Erfolg die dekodierten Ansprueche zurueck.
pub fn token_pruefen(
    token: &str,
    schluessel: &str,
    aussteller: &str,
    zielgruppe: &str,
) -> AuthResult<TokenAnsprueche> {
    let mut teile = token.split('.');
    let (kopf_b64, inhalt_b64, signatur_b64) = match (
        teile.next(),
        teile.next(),
        teile.next(),
        teile.next(),
    ) {
        (Some(k), Some(i), Some(s), None) => (k, i, s),
        _ => {
            return Err(AuthFehler::FormatUngueltig(
                "erwartet drei durch '.' getrennte Segmente".into(),
            ))
        }
    };

    // Signatur zuerst – vor jeder Interpretation des Inhalts
    let signatur = URL_SAFE_NO_PAD
        .decode(signatur_b64)
        .map_err(|e| AuthFehler::FormatUngueltig(format!("Signatur-Segment: {e}")))?;
    let signier_eingabe = format!("{kopf_b64}.{inhalt_b64}");
    hmac::verify(
        &hmac_schluessel(schluessel),
        signier_eingabe.as_bytes(),
        &signatur,
    )
    .map_err(|_| AuthFehler::SignaturUngueltig)?;

    let inhalt_bytes = URL_SAFE_NO_PAD
        .decode(inhalt_b64)
        .map_err(|e| AuthFehler::FormatUngueltig(format!("Anspruchs-Segment: {e}")))?;
    let inhalt: TokenAnsprueche = serde_json::from_slice(&inhalt_bytes)
        .map_err(|e| AuthFehler::FormatUngueltig(format!("Anspruchs-JSON: {e}")))?;

    if inhalt.iss != aussteller {
        return Err(AuthFehler::AusstellerFalsch {
            erwartet: aussteller.into(),
            erhalten: inhalt.iss,
        });
    }
    if inhalt.aud != zielgruppe {
        return Err(AuthFehler::ZielgruppeFalsch {
            erwartet: zielgruppe.into(),
            erhalten: inhalt.aud,
        });
    }
    if inhalt.exp <= chrono::Utc::now().timestamp() {
        return Err(AuthFehler::Abgelaufen);
    }

    Ok(inhalt)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
