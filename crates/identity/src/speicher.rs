//! Identitaets-Speicher – Ansprueche und Zertifikate pro Identitaet
//!
//! Der Erstzugriff auf eine Identitaet laeuft ueber
//! `initialisierung_sicherstellen`: eine explizite, idempotente
//! Operation mit geprueftem Boolean statt impliziter Aktivierungslogik.
//! Die Umgebungswerte werden als Struktur injiziert – Tests muessen
//! keine Prozess-Umgebungsvariablen setzen.
//!
//! Bei `deaktivieren` wird der gesamte Speicher als JSON persistiert;
//! ein neuer Speicher mit demselben Pfad laedt den Zustand wieder.

use dashmap::DashMap;
use kurier_auth::Anspruch;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::IdentitaetsResult;
use crate::zertifikat::{fingerabdruck_berechnen, zertifikat_im_verzeichnis_suchen};

// ---------------------------------------------------------------------------
// Umgebungswerte
// ---------------------------------------------------------------------------

/// Umgebungswerte fuer die Erst-Initialisierung einer Identitaet
#[derive(Debug, Clone, Default)]
pub struct IdentitaetsUmgebung {
    /// Semikolon-getrennte Anspruchs-Typen
    pub anspruch_typen: Option<String>,
    /// Semikolon-getrennte Anspruchs-Werte (gleiche Anzahl wie Typen)
    pub anspruch_werte: Option<String>,
    /// Verzeichnis mit PEM-Zertifikaten
    pub zertifikat_verzeichnis: Option<String>,
    /// Fingerabdruck des Dienst-Zertifikats (wird normalisiert)
    pub zertifikat_fingerabdruck: Option<String>,
}

impl IdentitaetsUmgebung {
    /// Liest die Umgebungswerte aus Prozess-Umgebungsvariablen
    pub fn aus_env() -> Self {
        Self {
            anspruch_typen: std::env::var("KURIER_IDENTITAET_ANSPRUCH_TYPEN").ok(),
            anspruch_werte: std::env::var("KURIER_IDENTITAET_ANSPRUCH_WERTE").ok(),
            zertifikat_verzeichnis: std::env::var("KURIER_X509_VERZEICHNIS").ok(),
            zertifikat_fingerabdruck: std::env::var("KURIER_X509_FINGERABDRUCK").ok(),
        }
    }
}

// ---------------------------------------------------------------------------
// Zustand
// ---------------------------------------------------------------------------

/// Persistierter Zustand einer Identitaet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct IdentitaetsZustand {
    ansprueche: Option<Vec<Anspruch>>,
    zertifikat_der: Option<Vec<u8>>,
    fingerabdruck: Option<String>,
}

/// Eintrag im Speicher: Zustand + Initialisierungs-Flag
#[derive(Debug, Default)]
struct IdentitaetsEintrag {
    initialisiert: bool,
    zustand: IdentitaetsZustand,
}

// ---------------------------------------------------------------------------
// IdentitaetsSpeicher
// ---------------------------------------------------------------------------

/// Speicher fuer Dienst-Identitaeten (Ansprueche + Zertifikate)
pub struct IdentitaetsSpeicher {
    eintraege: DashMap<String, IdentitaetsEintrag>,
    umgebung: IdentitaetsUmgebung,
    persistenz_pfad: Option<PathBuf>,
}

impl IdentitaetsSpeicher {
    /// Erstellt einen Speicher; laedt persistierten Zustand falls vorhanden
    pub fn neu(
        persistenz_pfad: Option<PathBuf>,
        umgebung: IdentitaetsUmgebung,
    ) -> IdentitaetsResult<Self> {
        let eintraege = DashMap::new();

        if let Some(pfad) = persistenz_pfad.as_deref() {
            if pfad.exists() {
                let geladen = Self::zustand_laden(pfad)?;
                for (identitaet, zustand) in geladen {
                    eintraege.insert(
                        identitaet,
                        IdentitaetsEintrag {
                            // Persistierter Zustand gilt als initialisiert
                            initialisiert: true,
                            zustand,
                        },
                    );
                }
                tracing::info!(
                    pfad = %pfad.display(),
                    identitaeten = eintraege.len(),
                    "Identitaets-Speicher geladen"
                );
            }
        }

        Ok(Self {
            eintraege,
            umgebung,
            persistenz_pfad,
        })
    }

    /// Stellt sicher dass eine Identitaet initialisiert ist (idempotent)
    ///
    /// Beim ersten Aufruf fuer eine Identitaet werden Ansprueche und
    /// Zertifikat aus der Umgebung geladen; jeder weitere Aufruf ist
    /// ein No-op. Ungleich lange Anspruchs-Listen werden mit einer
    /// Warnung uebersprungen.
    pub fn initialisierung_sicherstellen(&self, identitaet: &str) {
        let mut eintrag = self.eintraege.entry(identitaet.to_string()).or_default();
        if eintrag.initialisiert {
            return;
        }
        eintrag.initialisiert = true;

        if eintrag.zustand.ansprueche.is_some() || eintrag.zustand.zertifikat_der.is_some() {
            return;
        }

        // Ansprueche aus der Umgebung
        if let (Some(typen), Some(werte)) = (
            self.umgebung.anspruch_typen.as_deref(),
            self.umgebung.anspruch_werte.as_deref(),
        ) {
            let typen: Vec<&str> = typen.split(';').collect();
            let werte: Vec<&str> = werte.split(';').collect();

            if typen.len() != werte.len() {
                tracing::warn!(
                    identitaet,
                    typen = typen.len(),
                    werte = werte.len(),
                    "Anspruchs-Typen und -Werte ungleich lang, Ansprueche uebersprungen"
                );
            } else {
                let ansprueche = typen
                    .iter()
                    .zip(werte.iter())
                    .map(|(t, w)| Anspruch::neu(*t, *w))
                    .collect();
                eintrag.zustand.ansprueche = Some(ansprueche);
            }
        }

        // Zertifikat aus dem Verzeichnis
        if let (Some(verzeichnis), Some(fingerabdruck)) = (
            self.umgebung.zertifikat_verzeichnis.as_deref(),
            self.umgebung.zertifikat_fingerabdruck.as_deref(),
        ) {
            match zertifikat_im_verzeichnis_suchen(Path::new(verzeichnis), fingerabdruck) {
                Ok(Some(der)) => {
                    eintrag.zustand.fingerabdruck = Some(fingerabdruck_berechnen(&der));
                    eintrag.zustand.zertifikat_der = Some(der);
                }
                Ok(None) => {
                    tracing::warn!(
                        identitaet,
                        verzeichnis,
                        "Kein Zertifikat mit passendem Fingerabdruck gefunden"
                    );
                }
                Err(e) => {
                    tracing::warn!(identitaet, fehler = %e, "Zertifikats-Suche fehlgeschlagen");
                }
            }
        }

        tracing::debug!(identitaet, "Identitaet initialisiert");
    }

    /// Gibt das Zertifikat einer Identitaet zurueck (DER-Bytes)
    pub fn zertifikat_holen(&self, identitaet: &str) -> Option<Vec<u8>> {
        self.initialisierung_sicherstellen(identitaet);
        self.eintraege
            .get(identitaet)
            .and_then(|e| e.zustand.zertifikat_der.clone())
    }

    /// Gibt die Ansprueche einer Identitaet zurueck
    pub fn ansprueche_holen(&self, identitaet: &str) -> Option<Vec<Anspruch>> {
        self.initialisierung_sicherstellen(identitaet);
        self.eintraege
            .get(identitaet)
            .and_then(|e| e.zustand.ansprueche.clone())
    }

    /// Hinterlegt ein Zertifikat fuer eine Identitaet
    pub fn zertifikat_hinzufuegen(&self, identitaet: &str, der: Vec<u8>) {
        let mut eintrag = self.eintraege.entry(identitaet.to_string()).or_default();
        eintrag.initialisiert = true;
        eintrag.zustand.fingerabdruck = Some(fingerabdruck_berechnen(&der));
        eintrag.zustand.zertifikat_der = Some(der);
    }

    /// Hinterlegt Ansprueche fuer eine Identitaet
    pub fn ansprueche_hinzufuegen(&self, identitaet: &str, ansprueche: Vec<Anspruch>) {
        let mut eintrag = self.eintraege.entry(identitaet.to_string()).or_default();
        eintrag.initialisiert = true;
        eintrag.zustand.ansprueche = Some(ansprueche);
    }

    /// Persistiert den Speicher (Aufruf bei Deaktivierung)
    pub fn deaktivieren(&self) -> IdentitaetsResult<()> {
        let Some(pfad) = self.persistenz_pfad.as_deref() else {
            return Ok(());
        };

        let abbild: HashMap<String, IdentitaetsZustand> = self
            .eintraege
            .iter()
            .map(|e| (e.key().clone(), e.value().zustand.clone()))
            .collect();

        let json = serde_json::to_vec_pretty(&abbild)?;
        std::fs::write(pfad, json)?;
        tracing::info!(
            pfad = %pfad.display(),
            identitaeten = abbild.len(),
            "Identitaets-Speicher persistiert"
        );
        Ok(())
    }

    fn zustand_laden(pfad: &Path) -> IdentitaetsResult<HashMap<String, IdentitaetsZustand>> {
        let inhalt = std::fs::read(pfad)?;
        Ok(serde_json::from_slice(&inhalt)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
