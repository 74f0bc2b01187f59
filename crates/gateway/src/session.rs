//! Session-Cache – Vorwaerts- und Rueckwaerts-Tabelle unter einem Lock
//!
//! Die Vorwaerts-Tabelle bildet Session-Schluessel auf den aktiven
//! Adapter samt Abbruch-Scope ab, die Rueckwaerts-Tabelle Kanal-ID auf
//! Session-Schluessel (O(1)-Abbau aus Adapter-Ereignissen). Beide
//! Tabellen liegen hinter EINEM Mutex: Einfuegen, Nachschlagen und
//! Entfernen sind je eine kritische Sektion, die Tabellen bleiben
//! zueinander konsistent – eine Session ist entweder in beiden oder in
//! keiner.
//!
//! Der Abbau-Pfad bekommt einen Eintrag hoechstens einmal zurueck;
//! exactly-once folgt direkt aus der Map-Ownership, egal wie viele
//! Ausloeser (Adapter-Fehler, Adapter-Schliessen, Stopp) gleichzeitig
//! feuern.

use kurier_adapter::ProtokollAdapter;
use kurier_channel::Kanal;
use kurier_core::types::{KanalId, SessionSchluessel};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Eine aktive Session: Adapter plus eigener Abbruch-Scope
pub struct SessionEintrag {
    pub adapter: Arc<dyn ProtokollAdapter>,
    pub abbruch: CancellationToken,
}

/// Beide Tabellen, gemeinsam geschuetzt
#[derive(Default)]
struct Tabellen {
    vorwaerts: HashMap<SessionSchluessel, SessionEintrag>,
    rueckwaerts: HashMap<KanalId, SessionSchluessel>,
}

/// Session-Cache des Listeners
#[derive(Default)]
pub struct SessionCache {
    tabellen: Mutex<Tabellen>,
}

impl SessionCache {
    /// Erstellt einen leeren Cache
    pub fn neu() -> Self {
        Self::default()
    }

    /// Fuegt eine Session atomar in beide Tabellen ein
    ///
    /// Gibt false zurueck (und laesst beide Tabellen unveraendert) wenn
    /// der Schluessel bereits belegt ist.
    pub fn einfuegen(
        &self,
        schluessel: SessionSchluessel,
        kanal_id: KanalId,
        eintrag: SessionEintrag,
    ) -> bool {
        let mut tabellen = self.tabellen.lock();
        if tabellen.vorwaerts.contains_key(&schluessel) {
            return false;
        }
        tabellen.rueckwaerts.insert(kanal_id, schluessel.clone());
        tabellen.vorwaerts.insert(schluessel, eintrag);
        true
    }

    /// Gibt den Kanal einer aktiven Session zurueck
    pub fn kanal_holen(&self, schluessel: &SessionSchluessel) -> Option<Arc<dyn Kanal>> {
        self.tabellen
            .lock()
            .vorwaerts
            .get(schluessel)
            .map(|eintrag| eintrag.adapter.kanal())
    }

    /// Prueft ob ein Schluessel aktiv ist
    pub fn enthaelt(&self, schluessel: &SessionSchluessel) -> bool {
        self.tabellen.lock().vorwaerts.contains_key(schluessel)
    }

    /// Entfernt die Session zu einer Kanal-ID aus beiden Tabellen
    ///
    /// Hoechstens ein Aufrufer bekommt den Eintrag; jeder weitere
    /// Versuch (zweites Terminal-Ereignis, paralleler Stopp) geht leer
    /// aus.
    pub fn entfernen_nach_kanal(
        &self,
        kanal_id: &KanalId,
    ) -> Option<(SessionSchluessel, SessionEintrag)> {
        let mut tabellen = self.tabellen.lock();
        let schluessel = tabellen.rueckwaerts.remove(kanal_id)?;
        let eintrag = tabellen.vorwaerts.remove(&schluessel)?;
        Some((schluessel, eintrag))
    }

    /// Entfernt die Session zu einem Schluessel aus beiden Tabellen
    pub fn entfernen(&self, schluessel: &SessionSchluessel) -> Option<SessionEintrag> {
        let mut tabellen = self.tabellen.lock();
        let eintrag = tabellen.vorwaerts.remove(schluessel)?;
        let kanal_id = eintrag.adapter.kanal().id();
        tabellen.rueckwaerts.remove(&kanal_id);
        Some(eintrag)
    }

    /// Zieht alle Sessions ab und leert beide Tabellen (fuer den Stopp)
    pub fn alle_abziehen(&self) -> Vec<(SessionSchluessel, SessionEintrag)> {
        let mut tabellen = self.tabellen.lock();
        tabellen.rueckwaerts.clear();
        tabellen.vorwaerts.drain().collect()
    }

    /// Anzahl aktiver Sessions
    pub fn laenge(&self) -> usize {
        self.tabellen.lock().vorwaerts.len()
    }

    /// Invarianten-Pruefung fuer Tests: keine verwaisten Eintraege
    ///
    /// Jede Rueckwaerts-Zeile zeigt auf eine Vorwaerts-Zeile deren
    /// Kanal-ID zurueck auf die Rueckwaerts-Zeile zeigt, und umgekehrt.
    pub fn ist_konsistent(&self) -> bool {
        let tabellen = self.tabellen.lock();
        if tabellen.vorwaerts.len() != tabellen.rueckwaerts.len() {
            return false;
        }
        for (kanal_id, schluessel) in tabellen.rueckwaerts.iter() {
            match tabellen.vorwaerts.get(schluessel) {
                Some(eintrag) if eintrag.adapter.kanal().id() == *kanal_id => {}
                _ => return false,
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use kurier_adapter::{AdapterKontext, AdapterRegistratur};
    use kurier_auth::{BasisAuthentifikator, TokenArt};
    use kurier_core::ProtokollSenke;
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use tokio::net::UdpSocket;

    fn localhost(port: u16) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
    }

    async fn test_eintrag(peer_port: u16) -> (SessionSchluessel, KanalId, SessionEintrag) {
        let socket = UdpSocket::bind(localhost(0)).await.unwrap();
        let peer = localhost(peer_port);
        let abbruch = CancellationToken::new();

        let registratur = AdapterRegistratur::mit_basis();
        let (adapter, _rx) = registratur
            .erzeugen(
                "basis",
                AdapterKontext {
                    socket: Arc::new(socket),
                    peer,
                    authentifikator: Arc::new(BasisAuthentifikator::neu()),
                    token_art: TokenArt::Jwt,
                    senke: Arc::new(ProtokollSenke),
                    abbruch: abbruch.clone(),
                    max_datagramm_bytes: 1400,
                },
            )
            .unwrap();

        let schluessel = SessionSchluessel::von_endpunkt(&peer);
        let kanal_id = adapter.kanal().id();
        (schluessel, kanal_id, SessionEintrag { adapter, abbruch })
    }

    #[tokio::test]
    async fn einfuegen_und_nachschlagen() {
        let cache = SessionCache::neu();
        let (schluessel, kanal_id, eintrag) = test_eintrag(40001).await;

        assert!(cache.einfuegen(schluessel.clone(), kanal_id, eintrag));
        assert_eq!(cache.laenge(), 1);
        assert!(cache.enthaelt(&schluessel));
        assert!(cache.kanal_holen(&schluessel).is_some());
        assert!(cache.ist_konsistent());
    }

    #[tokio::test]
    async fn doppelter_schluessel_wird_abgelehnt() {
        let cache = SessionCache::neu();
        let (schluessel, kanal_id_a, eintrag_a) = test_eintrag(40002).await;
        let (_, kanal_id_b, eintrag_b) = test_eintrag(40002).await;

        assert!(cache.einfuegen(schluessel.clone(), kanal_id_a, eintrag_a));
        assert!(!cache.einfuegen(schluessel.clone(), kanal_id_b, eintrag_b));

        // Kein verwaister Rueckwaerts-Eintrag fuer den zweiten Kanal
        assert_eq!(cache.laenge(), 1);
        assert!(cache.entfernen_nach_kanal(&kanal_id_b).is_none());
        assert!(cache.ist_konsistent());
    }

    #[tokio::test]
    async fn entfernen_nach_kanal_genau_einmal() {
        let cache = SessionCache::neu();
        let (schluessel, kanal_id, eintrag) = test_eintrag(40003).await;
        cache.einfuegen(schluessel.clone(), kanal_id, eintrag);

        // Erster Abbau-Pfad bekommt den Eintrag
        let erster = cache.entfernen_nach_kanal(&kanal_id);
        assert!(erster.is_some());
        // Jeder weitere geht leer aus
        assert!(cache.entfernen_nach_kanal(&kanal_id).is_none());
        assert!(cache.entfernen(&schluessel).is_none());

        assert_eq!(cache.laenge(), 0);
        assert!(cache.ist_konsistent());
    }

    #[tokio::test]
    async fn entfernen_nach_schluessel_bereinigt_rueckwaerts() {
        let cache = SessionCache::neu();
        let (schluessel, kanal_id, eintrag) = test_eintrag(40004).await;
        cache.einfuegen(schluessel.clone(), kanal_id, eintrag);

        assert!(cache.entfernen(&schluessel).is_some());
        assert!(cache.entfernen_nach_kanal(&kanal_id).is_none());
        assert!(cache.ist_konsistent());
    }

    #[tokio::test]
    async fn alle_abziehen_leert_beide_tabellen() {
        let cache = SessionCache::neu();
        for port in 40010..40013 {
            let (schluessel, kanal_id, eintrag) = test_eintrag(port).await;
            cache.einfuegen(schluessel, kanal_id, eintrag);
        }
        assert_eq!(cache.laenge(), 3);

        let abgezogen = cache.alle_abziehen();
        assert_eq!(abgezogen.len(), 3);
        assert_eq!(cache.laenge(), 0);
        assert!(cache.ist_konsistent());

        // Zweiter Abzug ist leer
        assert!(cache.alle_abziehen().is_empty());
    }

    #[tokio::test]
    async fn verschiedene_schluessel_bleiben_getrennt() {
        let cache = SessionCache::neu();
        let (schluessel_a, kanal_id_a, eintrag_a) = test_eintrag(40020).await;
        let (schluessel_b, kanal_id_b, eintrag_b) = test_eintrag(40021).await;

        cache.einfuegen(schluessel_a.clone(), kanal_id_a, eintrag_a);
        cache.einfuegen(schluessel_b.clone(), kanal_id_b, eintrag_b);

        let (entfernt, _) = cache.entfernen_nach_kanal(&kanal_id_a).unwrap();
        assert_eq!(entfernt, schluessel_a);
        assert!(cache.enthaelt(&schluessel_b));
        assert!(cache.ist_konsistent());
    }
}
