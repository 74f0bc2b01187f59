//! Adapter-Registratur – Protokollname -> Konstruktor
//!
//! Die Auswahl des konkreten Adapters ist eine Daten-Frage, keine
//! Kontrollfluss-Frage: neue Protokolle registrieren einen Konstruktor
//! unter ihrem Namen, der Erzeugungs-Pfad bleibt unveraendert.
//!
//! Konstruktoren sind reine Funktionen: kein I/O, kein Blockieren.
//! Alles I/O passiert erst nachdem der Aufrufer den Kanal oeffnet.

use kurier_auth::{Authentifikator, TokenArt};
use kurier_core::Nachrichtensenke;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::adapter::ProtokollAdapter;
use crate::basis::BasisAdapter;
use crate::ereignis::AdapterEreignis;
use crate::error::AdapterFehler;

/// Transport- und Capability-Kontext fuer die Adapter-Erzeugung
#[derive(Clone)]
pub struct AdapterKontext {
    /// Geteilter, bereits gebundener Datagramm-Socket
    pub socket: Arc<UdpSocket>,
    /// Adresse der Gegenstelle
    pub peer: SocketAddr,
    /// Authentifikator-Capability
    pub authentifikator: Arc<dyn Authentifikator>,
    /// Erwartete Token-Art
    pub token_art: TokenArt,
    /// Senke fuer dekodierte Anwendungsnachrichten
    pub senke: Arc<dyn Nachrichtensenke>,
    /// Abbruch-Scope dieser Session
    pub abbruch: CancellationToken,
    /// Maximale Datagramm-Groesse in Bytes
    pub max_datagramm_bytes: usize,
}

/// Ergebnis der Erzeugung: Adapter plus der eine Ereignis-Empfaenger
///
/// Der Empfaenger existiert ab der Konstruktion – der Aufrufer ist
/// damit abonniert BEVOR der Kanal geoeffnet wird und kann kein
/// fruehes Schliessen verpassen.
pub type AdapterErzeugnis = (
    Arc<dyn ProtokollAdapter>,
    mpsc::UnboundedReceiver<AdapterEreignis>,
);

/// Konstruktor-Funktion eines Adapters
pub type AdapterKonstruktor = Arc<dyn Fn(AdapterKontext) -> AdapterErzeugnis + Send + Sync>;

/// Registratur aller bekannten Protokolle
pub struct AdapterRegistratur {
    eintraege: RwLock<HashMap<String, AdapterKonstruktor>>,
}

impl AdapterRegistratur {
    /// Erstellt eine leere Registratur
    pub fn neu() -> Self {
        Self {
            eintraege: RwLock::new(HashMap::new()),
        }
    }

    /// Erstellt eine Registratur mit dem eingebauten Basis-Protokoll
    pub fn mit_basis() -> Self {
        let registratur = Self::neu();
        registratur.registrieren("basis", Arc::new(BasisAdapter::neu));
        registratur
    }

    /// Registriert einen Konstruktor unter einem Protokollnamen
    ///
    /// Ein bereits vorhandener Name wird ueberschrieben.
    pub fn registrieren(&self, name: impl Into<String>, konstruktor: AdapterKonstruktor) {
        let name = name.into();
        tracing::debug!(protokoll = %name, "Adapter-Konstruktor registriert");
        self.eintraege.write().insert(name, konstruktor);
    }

    /// Erzeugt einen Adapter fuer den Protokollnamen
    ///
    /// Reine Konstruktion – kein I/O, kein Blockieren.
    pub fn erzeugen(
        &self,
        protokoll: &str,
        kontext: AdapterKontext,
    ) -> Result<AdapterErzeugnis, AdapterFehler> {
        let konstruktor = self
            .eintraege
            .read()
            .get(protokoll)
            .cloned()
            .ok_or_else(|| AdapterFehler::ProtokollUnbekannt(protokoll.to_string()))?;
        Ok(konstruktor(kontext))
    }

    /// Namen aller registrierten Protokolle
    pub fn protokolle(&self) -> Vec<String> {
        self.eintraege.read().keys().cloned().collect()
    }
}

impl Default for AdapterRegistratur {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
