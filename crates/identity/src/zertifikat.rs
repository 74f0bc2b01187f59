//! Zertifikats-Hilfen: PEM-Laden und Fingerabdruecke
//!
//! Fingerabdruecke werden vor jedem Vergleich normalisiert: alle
//! Nicht-Hex-Zeichen entfernt, Rest in Grossbuchstaben. Damit sind
//! `ab:cd:ef`, `AB CD EF` und `abcdef` dieselbe Angabe.

use sha2::{Digest, Sha256};
use std::path::Path;

use crate::error::{IdentitaetsFehler, IdentitaetsResult};

/// Normalisiert einen Fingerabdruck: Nicht-Hex raus, Grossbuchstaben
pub fn fingerabdruck_normalisieren(roh: &str) -> String {
    roh.chars()
        .filter(|c| c.is_ascii_hexdigit())
        .collect::<String>()
        .to_ascii_uppercase()
}

/// Berechnet den SHA-256-Fingerabdruck eines DER-Zertifikats (Hex, gross)
pub fn fingerabdruck_berechnen(der: &[u8]) -> String {
    let digest = Sha256::digest(der);
    digest.iter().map(|b| format!("{b:02X}")).collect()
}

/// Liest das erste Zertifikat einer PEM-Datei als DER-Bytes
pub fn zertifikat_aus_pem_datei(pfad: &Path) -> IdentitaetsResult<Option<Vec<u8>>> {
    let inhalt = std::fs::read(pfad)
        .map_err(|e| IdentitaetsFehler::ZertifikatUnlesbar(format!("{}: {e}", pfad.display())))?;
    let mut leser = std::io::Cursor::new(inhalt);

    let ergebnis = match rustls_pemfile::certs(&mut leser).next() {
        Some(Ok(der)) => Ok(Some(der.as_ref().to_vec())),
        Some(Err(e)) => Err(IdentitaetsFehler::ZertifikatUnlesbar(format!(
            "{}: {e}",
            pfad.display()
        ))),
        None => Ok(None),
    };
    ergebnis
}

/// Sucht in einem Verzeichnis das Zertifikat mit dem gegebenen Fingerabdruck
///
/// Durchsucht alle `.pem`-Dateien; der Fingerabdruck wird vor dem
/// Vergleich normalisiert. Unlesbare Dateien werden uebersprungen
/// und geloggt.
pub fn zertifikat_im_verzeichnis_suchen(
    verzeichnis: &Path,
    fingerabdruck: &str,
) -> IdentitaetsResult<Option<Vec<u8>>> {
    let gesucht = fingerabdruck_normalisieren(fingerabdruck);
    if gesucht.is_empty() {
        return Ok(None);
    }

    let eintraege = std::fs::read_dir(verzeichnis).map_err(|e| {
        IdentitaetsFehler::ZertifikatUnlesbar(format!("{}: {e}", verzeichnis.display()))
    })?;

    for eintrag in eintraege.flatten() {
        let pfad = eintrag.path();
        if pfad.extension().and_then(|e| e.to_str()) != Some("pem") {
            continue;
        }

        match zertifikat_aus_pem_datei(&pfad) {
            Ok(Some(der)) => {
                if fingerabdruck_berechnen(&der) == gesucht {
                    return Ok(Some(der));
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(datei = %pfad.display(), fehler = %e, "PEM-Datei uebersprungen");
            }
        }
    }

    Ok(None)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalisieren_entfernt_trennzeichen() {
        assert_eq!(fingerabdruck_normalisieren("ab:cd:ef"), "ABCDEF");
        assert_eq!(fingerabdruck_normalisieren("AB CD EF"), "ABCDEF");
        assert_eq!(fingerabdruck_normalisieren("ab-cd-ef"), "ABCDEF");
    }

    #[test]
    fn normalisieren_behaelt_hex() {
        assert_eq!(fingerabdruck_normalisieren("0123456789abcdefABCDEF"),
            "0123456789ABCDEFABCDEF");
    }

    #[test]
    fn normalisieren_leerer_rest() {
        assert_eq!(fingerabdruck_normalisieren("zz::--"), "");
    }

    #[test]
    fn fingerabdruck_ist_hex_gross() {
        let fp = fingerabdruck_berechnen(b"testdaten");
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(fp, fp.to_ascii_uppercase());
    }

    #[test]
    fn verzeichnis_suche_findet_zertifikat() {
        let verzeichnis = std::env::temp_dir().join(format!(
            "kurier-zert-test-{}",
            uuid::Uuid::new_v4()
        ));
        std::fs::create_dir_all(&verzeichnis).unwrap();

        let zert = rcgen::generate_simple_self_signed(vec!["localhost".into()]).unwrap();
        std::fs::write(verzeichnis.join("dienst.pem"), zert.cert.pem()).unwrap();

        let der = zert.cert.der().as_ref().to_vec();
        let fingerabdruck = fingerabdruck_berechnen(&der);

        // Unnormalisierte Angabe (klein, mit Doppelpunkten) muss treffen
        let mit_trennern: String = fingerabdruck
            .to_ascii_lowercase()
            .as_bytes()
            .chunks(2)
            .map(|paar| std::str::from_utf8(paar).unwrap())
            .collect::<Vec<_>>()
            .join(":");

        let gefunden = zertifikat_im_verzeichnis_suchen(&verzeichnis, &mit_trennern)
            .unwrap()
            .expect("Zertifikat muss gefunden werden");
        assert_eq!(gefunden, der);

        std::fs::remove_dir_all(&verzeichnis).ok();
    }

    #[test]
    fn verzeichnis_suche_ohne_treffer() {
        let verzeichnis = std::env::temp_dir().join(format!(
            "kurier-zert-leer-{}",
            uuid::Uuid::new_v4()
        ));
        std::fs::create_dir_all(&verzeichnis).unwrap();

        let gefunden =
            zertifikat_im_verzeichnis_suchen(&verzeichnis, "AABBCC").unwrap();
        assert!(gefunden.is_none());

        std::fs::remove_dir_all(&verzeichnis).ok();
    }
}
