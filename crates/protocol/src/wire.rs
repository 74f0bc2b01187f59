//! Wire-Format fuer Datagramm-Transporte
//!
//! Ein Datagramm transportiert genau einen Rahmen. Kein Laengen-Feld
//! noetig – die Datagramm-Grenze ist die Rahmen-Grenze.
//!
//! ## Format
//!
//! ```text
//! +--------+--------+----...----+
//! | Magic  | Version| JSON      |
//! | 0x4B   | 0x01   | Payload   |
//! +--------+--------+----...----+
//! ```
//!
//! Das Magic-Byte (`K`) erlaubt dem Gateway, fremden Verkehr auf dem
//! Socket frueh zu verwerfen. Maximale Datagramm-Groesse ist
//! konfigurierbar (Standard: 1400 Bytes, unterhalb der ueblichen MTU).

use bytes::{BufMut, BytesMut};
use thiserror::Error;

use crate::rahmen::GatewayRahmen;

// ---------------------------------------------------------------------------
// Konstanten
// ---------------------------------------------------------------------------

/// Magic-Byte am Rahmen-Anfang (`K` fuer Kurier)
pub const MAGIC: u8 = 0x4B;

/// Aktuelle Protokollversion
pub const VERSION: u8 = 0x01;

/// Groesse des Headers in Bytes (Magic + Version)
pub const HEADER_GROESSE: usize = 2;

/// Standard-maximale Datagramm-Groesse (unterhalb ueblicher MTU)
pub const DEFAULT_MAX_DATAGRAMM: usize = 1400;

// ---------------------------------------------------------------------------
// Fehler
// ---------------------------------------------------------------------------

/// Fehler beim Kodieren/Dekodieren eines Rahmens
#[derive(Debug, Error)]
pub enum RahmenFehler {
    #[error("Datagramm zu kurz: {0} Bytes (Minimum: {HEADER_GROESSE})")]
    ZuKurz(usize),

    #[error("Datagramm zu gross: {ist} Bytes (Maximum: {maximum})")]
    ZuGross { ist: usize, maximum: usize },

    #[error("Ungueltiges Magic-Byte: 0x{0:02X}")]
    FalschesMagic(u8),

    #[error("Protokollversion nicht unterstuetzt: erwartet={VERSION}, erhalten={0}")]
    FalscheVersion(u8),

    #[error("JSON-Deserialisierung fehlgeschlagen: {0}")]
    Deserialisierung(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Kodierung
// ---------------------------------------------------------------------------

/// Kodiert einen Rahmen in ein Datagramm
///
/// # Fehler
/// - `ZuGross` wenn das Ergebnis die maximale Datagramm-Groesse sprengt
pub fn kodieren(rahmen: &GatewayRahmen, max_groesse: usize) -> Result<Vec<u8>, RahmenFehler> {
    let json = serde_json::to_vec(rahmen)?;

    let gesamt = HEADER_GROESSE + json.len();
    if gesamt > max_groesse {
        return Err(RahmenFehler::ZuGross {
            ist: gesamt,
            maximum: max_groesse,
        });
    }

    let mut buf = BytesMut::with_capacity(gesamt);
    buf.put_u8(MAGIC);
    buf.put_u8(VERSION);
    buf.put_slice(&json);
    Ok(buf.to_vec())
}

/// Dekodiert ein Datagramm in einen Rahmen
///
/// # Fehler
/// - `ZuKurz` / `ZuGross` bei Verletzung der Groessengrenzen
/// - `FalschesMagic` / `FalscheVersion` bei fremdem Verkehr
/// - `Deserialisierung` bei ungueltigem JSON
pub fn dekodieren(daten: &[u8], max_groesse: usize) -> Result<GatewayRahmen, RahmenFehler> {
    if daten.len() < HEADER_GROESSE {
        return Err(RahmenFehler::ZuKurz(daten.len()));
    }
    if daten.len() > max_groesse {
        return Err(RahmenFehler::ZuGross {
            ist: daten.len(),
            maximum: max_groesse,
        });
    }
    if daten[0] != MAGIC {
        return Err(RahmenFehler::FalschesMagic(daten[0]));
    }
    if daten[1] != VERSION {
        return Err(RahmenFehler::FalscheVersion(daten[1]));
    }

    let rahmen = serde_json::from_slice(&daten[HEADER_GROESSE..])?;
    Ok(rahmen)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rahmen::FehlerCode;

    fn test_rahmen() -> GatewayRahmen {
        GatewayRahmen::Ping {
            zeitstempel: 999888777,
        }
    }

    #[test]
    fn kodieren_dekodieren_round_trip() {
        let original = test_rahmen();
        let datagramm = kodieren(&original, DEFAULT_MAX_DATAGRAMM).unwrap();

        assert_eq!(datagramm[0], MAGIC);
        assert_eq!(datagramm[1], VERSION);

        let dekodiert = dekodieren(&datagramm, DEFAULT_MAX_DATAGRAMM).unwrap();
        match dekodiert {
            GatewayRahmen::Ping { zeitstempel } => assert_eq!(zeitstempel, 999888777),
            _ => panic!("Erwartet Ping"),
        }
    }

    #[test]
    fn dekodieren_zu_kurz() {
        let ergebnis = dekodieren(&[MAGIC], DEFAULT_MAX_DATAGRAMM);
        assert!(matches!(ergebnis, Err(RahmenFehler::ZuKurz(1))));
    }

    #[test]
    fn dekodieren_falsches_magic() {
        let ergebnis = dekodieren(&[0xFF, VERSION, b'{', b'}'], DEFAULT_MAX_DATAGRAMM);
        assert!(matches!(ergebnis, Err(RahmenFehler::FalschesMagic(0xFF))));
    }

    #[test]
    fn dekodieren_falsche_version() {
        let ergebnis = dekodieren(&[MAGIC, 0x7F, b'{', b'}'], DEFAULT_MAX_DATAGRAMM);
        assert!(matches!(ergebnis, Err(RahmenFehler::FalscheVersion(0x7F))));
    }

    #[test]
    fn dekodieren_ungueltiges_json() {
        let ergebnis = dekodieren(&[MAGIC, VERSION, b'x', b'y'], DEFAULT_MAX_DATAGRAMM);
        assert!(matches!(ergebnis, Err(RahmenFehler::Deserialisierung(_))));
    }

    #[test]
    fn kodieren_ablehnung_zu_grosser_rahmen() {
        let rahmen = GatewayRahmen::Veroeffentlichen {
            ressource: "r".into(),
            sequenz: 0,
            nutzdaten: vec![0u8; 4096],
        };
        let ergebnis = kodieren(&rahmen, DEFAULT_MAX_DATAGRAMM);
        assert!(matches!(ergebnis, Err(RahmenFehler::ZuGross { .. })));
    }

    #[test]
    fn dekodieren_ablehnung_zu_grosses_datagramm() {
        let rahmen = GatewayRahmen::fehler(FehlerCode::InternalError, "x");
        let datagramm = kodieren(&rahmen, DEFAULT_MAX_DATAGRAMM).unwrap();
        let ergebnis = dekodieren(&datagramm, 4);
        assert!(matches!(ergebnis, Err(RahmenFehler::ZuGross { .. })));
    }
}
