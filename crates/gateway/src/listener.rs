//! Gateway-Listener – Empfangs-Loop, Session-Aufbau und -Abbau
//!
//! ## Architektur
//!
//! ```text
//! UDP Socket (recv_from)                        ein Empfangs-Loop
//!     |
//!     v
//! SessionSchluessel::von_endpunkt()             "<ip>:<port>"
//!     |
//!     +-- bekannt --> Kanal::nachricht_einreihen()
//!     |
//!     +-- neu -----> Registratur -> Adapter -> Kanal oeffnen
//!                    -> Cache-Einfuegen -> init() -> einreihen
//!                         |
//!                         v  (Adapter meldet Geschlossen)
//!                    Ueberwachungs-Task -> Cache-Entfernen
//!                    -> Scope abbrechen -> Adapter entsorgen
//! ```
//!
//! Der Empfangs-Loop blockiert nur beim Warten auf das naechste
//! Datagramm. Adapter-Arbeit (Dekodieren, Authentifizieren) laeuft in
//! eigenen Tasks pro Session und bremst den Loop nicht. Ein einzelnes
//! kaputtes Datagramm beendet den Listener nie.

use kurier_adapter::{AdapterEreignis, AdapterKontext, AdapterRegistratur};
use kurier_auth::{Authentifikator, TokenArt};
use kurier_core::types::{KanalId, SessionSchluessel};
use kurier_core::Nachrichtensenke;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use crate::error::GatewayFehler;
use crate::session::{SessionCache, SessionEintrag};

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Konfiguration des Gateway-Listeners
#[derive(Debug, Clone)]
pub struct ListenerKonfiguration {
    /// Bind-Adresse (z.B. "0.0.0.0:5683")
    pub bind_adresse: SocketAddr,
    /// Protokollname fuer die Adapter-Registratur
    pub protokoll: String,
    /// Erwartete Token-Art der Clients
    pub token_art: TokenArt,
    /// Maximale Datagramm-Groesse in Bytes
    pub max_datagramm_bytes: usize,
    /// Maximale Anzahl gleichzeitiger Sessions
    pub max_sessions: usize,
}

impl ListenerKonfiguration {
    /// Erstellt eine Konfiguration mit Standard-Werten
    pub fn neu(bind_adresse: SocketAddr) -> Self {
        Self {
            bind_adresse,
            protokoll: "basis".into(),
            token_art: TokenArt::Jwt,
            max_datagramm_bytes: 1400,
            max_sessions: 512,
        }
    }
}

/// Listener-Fehler als Meldung fuer Beobachter
#[derive(Debug, Clone)]
pub struct ListenerFehlerMeldung {
    /// Betroffene Gegenstelle, falls bekannt
    pub peer: Option<SocketAddr>,
    pub nachricht: String,
}

// ---------------------------------------------------------------------------
// GatewayListener
// ---------------------------------------------------------------------------

/// Datagramm-Listener mit Session-Demultiplexing
pub struct GatewayListener {
    konfig: ListenerKonfiguration,
    socket: Arc<UdpSocket>,
    cache: Arc<SessionCache>,
    registratur: Arc<AdapterRegistratur>,
    authentifikator: Arc<dyn Authentifikator>,
    senke: Arc<dyn Nachrichtensenke>,
    abbruch: CancellationToken,
    fehler: broadcast::Sender<ListenerFehlerMeldung>,
}

impl GatewayListener {
    /// Bindet den Socket und erstellt den Listener
    pub async fn binden(
        konfig: ListenerKonfiguration,
        registratur: Arc<AdapterRegistratur>,
        authentifikator: Arc<dyn Authentifikator>,
        senke: Arc<dyn Nachrichtensenke>,
    ) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(konfig.bind_adresse).await?;
        tracing::info!(
            adresse = %konfig.bind_adresse,
            protokoll = %konfig.protokoll,
            "Gateway-Listener gebunden"
        );

        Ok(Self {
            konfig,
            socket: Arc::new(socket),
            cache: Arc::new(SessionCache::neu()),
            registratur,
            authentifikator,
            senke,
            abbruch: CancellationToken::new(),
            fehler: broadcast::channel(64).0,
        })
    }

    /// Gibt die lokale Bind-Adresse zurueck
    pub fn lokale_adresse(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Zugriff auf den Session-Cache (Wiring und Tests)
    pub fn cache(&self) -> &Arc<SessionCache> {
        &self.cache
    }

    /// Abonniert die Listener-Fehlermeldungen
    pub fn abonnieren_fehler(&self) -> broadcast::Receiver<ListenerFehlerMeldung> {
        self.fehler.subscribe()
    }

    /// Startet die Empfangs-Loop (laeuft bis zum Abbruch)
    ///
    /// Der Loop suspendiert ausschliesslich beim Warten auf das
    /// naechste Datagramm; jede Iteration faengt ihre Fehler selbst.
    pub async fn starten(&self) {
        let mut buf = vec![0u8; self.konfig.max_datagramm_bytes];

        tracing::info!("Gateway-Empfangs-Loop gestartet");

        loop {
            tokio::select! {
                _ = self.abbruch.cancelled() => {
                    tracing::info!("Gateway-Listener: Abbruch-Signal empfangen");
                    break;
                }

                ergebnis = self.socket.recv_from(&mut buf) => {
                    match ergebnis {
                        Ok((laenge, absender)) => {
                            // Leere Datagramme erzeugen keine Session
                            if laenge == 0 {
                                continue;
                            }
                            if let Err(e) =
                                self.datagramm_verarbeiten(&buf[..laenge], absender).await
                            {
                                self.fehler_melden(Some(absender), &e);
                            }
                        }
                        Err(e) => {
                            tracing::error!(fehler = %e, "UDP-Empfangsfehler");
                            let _ = self.fehler.send(ListenerFehlerMeldung {
                                peer: None,
                                nachricht: e.to_string(),
                            });
                            // Kurze Pause um Busy-Loop bei persistentem Fehler zu vermeiden
                            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
                        }
                    }
                }
            }
        }

        tracing::info!("Gateway-Empfangs-Loop beendet");
    }

    /// Stoppt den Listener und baut alle Sessions ab
    ///
    /// Der Schnappschuss leert beide Tabellen in einer kritischen
    /// Sektion; parallel feuernde Adapter-Abbau-Pfade gehen danach
    /// leer aus – jede Session wird genau einmal entsorgt.
    pub async fn stoppen(&self) {
        self.abbruch.cancel();

        let sessions = self.cache.alle_abziehen();
        let anzahl = sessions.len();
        for (schluessel, eintrag) in sessions {
            eintrag.abbruch.cancel();
            eintrag.adapter.entsorgen().await;
            tracing::debug!(session = %schluessel, "Session beim Stopp abgebaut");
        }

        tracing::info!(sessions = anzahl, "Gateway-Listener gestoppt");
    }

    // -----------------------------------------------------------------------
    // Internes Datagramm-Processing
    // -----------------------------------------------------------------------

    /// Verarbeitet ein eingehendes Datagramm (Hot Path)
    async fn datagramm_verarbeiten(
        &self,
        daten: &[u8],
        absender: SocketAddr,
    ) -> Result<(), GatewayFehler> {
        let schluessel = SessionSchluessel::von_endpunkt(&absender);

        // Bekannte Session: direkt zustellen
        if let Some(kanal) = self.cache.kanal_holen(&schluessel) {
            if let Err(e) = kanal.nachricht_einreihen(daten.to_vec()).await {
                // Paralleler Abbau hat die Session bereits entfernt –
                // die Zustellung wird verworfen, kein Fehler
                tracing::debug!(
                    session = %schluessel,
                    fehler = %e,
                    "Zustellung verworfen (Session im Abbau)"
                );
            }
            return Ok(());
        }

        self.session_erzeugen(schluessel, daten, absender).await
    }

    /// Baut eine neue Session auf und stellt das erste Datagramm zu
    async fn session_erzeugen(
        &self,
        schluessel: SessionSchluessel,
        daten: &[u8],
        absender: SocketAddr,
    ) -> Result<(), GatewayFehler> {
        let aktiv = self.cache.laenge();
        if aktiv >= self.konfig.max_sessions {
            tracing::warn!(
                peer = %absender,
                max = self.konfig.max_sessions,
                "Session-Limit erreicht, Datagramm verworfen"
            );
            return Err(GatewayFehler::SessionLimit(aktiv));
        }

        // Session-eigener Abbruch-Scope; der Listener-Stopp bricht
        // ueber die Eltern-Beziehung alle Sessions mit ab
        let abbruch = self.abbruch.child_token();

        // Reine Konstruktion; der Ereignis-Empfaenger existiert damit
        // VOR dem Kanal-Oeffnen – ein fruehes Schliessen geht nicht
        // verloren
        let (adapter, ereignis_rx) = self.registratur.erzeugen(
            &self.konfig.protokoll,
            AdapterKontext {
                socket: self.socket.clone(),
                peer: absender,
                authentifikator: self.authentifikator.clone(),
                token_art: self.konfig.token_art,
                senke: self.senke.clone(),
                abbruch: abbruch.clone(),
                max_datagramm_bytes: self.konfig.max_datagramm_bytes,
            },
        )?;

        let kanal = adapter.kanal();
        let kanal_id = kanal.id();
        self.ueberwachung_starten(kanal_id, ereignis_rx);

        kanal.oeffnen().await?;

        if !self.cache.einfuegen(
            schluessel.clone(),
            kanal_id,
            SessionEintrag {
                adapter: adapter.clone(),
                abbruch,
            },
        ) {
            // Der einzige Schreiber ist der Empfangs-Loop selbst;
            // ein belegter Schluessel heisst die Session existiert schon
            adapter.entsorgen().await;
            return Ok(());
        }

        if let Err(e) = adapter.init() {
            // Halbfertige Session darf nicht in den Tabellen bleiben
            if let Some((_, eintrag)) = self.cache.entfernen_nach_kanal(&kanal_id) {
                eintrag.abbruch.cancel();
                eintrag.adapter.entsorgen().await;
            }
            return Err(e.into());
        }

        tracing::info!(session = %schluessel, kanal = %kanal_id, "Session erstellt");

        if let Err(e) = kanal.nachricht_einreihen(daten.to_vec()).await {
            // Session wurde direkt nach dem Aufbau wieder abgebaut
            tracing::debug!(session = %schluessel, fehler = %e, "Erstzustellung verworfen");
        }
        Ok(())
    }

    /// Startet den Ueberwachungs-Task einer Session
    ///
    /// Der Task treibt den Abbau sobald der Adapter sein Terminal-
    /// Ereignis meldet; Fehler-Ereignisse werden geloggt.
    fn ueberwachung_starten(
        &self,
        kanal_id: KanalId,
        mut ereignis_rx: mpsc::UnboundedReceiver<AdapterEreignis>,
    ) {
        let cache = self.cache.clone();

        tokio::spawn(async move {
            while let Some(ereignis) = ereignis_rx.recv().await {
                match ereignis {
                    AdapterEreignis::Fehler { kanal_id, fehler } => {
                        tracing::warn!(
                            kanal = %kanal_id,
                            fehler = %fehler,
                            fatal = fehler.ist_fatal(),
                            "Adapter-Fehler"
                        );
                    }
                    AdapterEreignis::Geschlossen { kanal_id } => {
                        session_abbauen(&cache, kanal_id).await;
                        break;
                    }
                }
            }
            tracing::trace!(kanal = %kanal_id, "Ueberwachungs-Task beendet");
        });
    }

    /// Meldet einen Iterations-Fehler ueber Log und Fehler-Ereignis
    fn fehler_melden(&self, peer: Option<SocketAddr>, fehler: &GatewayFehler) {
        tracing::warn!(
            peer = peer.map(|p| p.to_string()).unwrap_or_else(|| "-".into()),
            fehler = %fehler,
            "Datagramm-Verarbeitung fehlgeschlagen"
        );
        let _ = self.fehler.send(ListenerFehlerMeldung {
            peer,
            nachricht: fehler.to_string(),
        });
    }
}

/// Baut die Session zu einer Kanal-ID ab (hoechstens einmal wirksam)
async fn session_abbauen(cache: &SessionCache, kanal_id: KanalId) {
    if let Some((schluessel, eintrag)) = cache.entfernen_nach_kanal(&kanal_id) {
        eintrag.abbruch.cancel();
        eintrag.adapter.entsorgen().await;
        tracing::info!(session = %schluessel, kanal = %kanal_id, "Session abgebaut");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use kurier_adapter::{
        AdapterEreignisse, AdapterErzeugnis, AdapterFehler, ProtokollAdapter,
    };
    use kurier_auth::BasisAuthentifikator;
    use kurier_channel::{Kanal, UdpKanal};
    use kurier_core::types::RessourcenId;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    fn localhost(port: u16) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
    }

    /// Senke die Zustellungen pro Absender-Identitaet aufzeichnet
    #[derive(Default)]
    struct AufzeichnungsSenke {
        zustellungen: Mutex<HashMap<String, Vec<Vec<u8>>>>,
    }

    impl AufzeichnungsSenke {
        fn nachrichten_von(&self, identitaet: &str) -> Vec<Vec<u8>> {
            self.zustellungen
                .lock()
                .get(identitaet)
                .cloned()
                .unwrap_or_default()
        }

        fn gesamt(&self) -> usize {
            self.zustellungen.lock().values().map(Vec::len).sum()
        }
    }

    #[async_trait]
    impl Nachrichtensenke for AufzeichnungsSenke {
        async fn veroeffentlichen(
            &self,
            _ressource: &RessourcenId,
            identitaet: &str,
            nutzdaten: Vec<u8>,
        ) -> kurier_core::Result<()> {
            self.zustellungen
                .lock()
                .entry(identitaet.to_string())
                .or_default()
                .push(nutzdaten);
            Ok(())
        }
    }

    /// Test-Adapter: reicht jedes rohe Datagramm an die Senke weiter
    ///
    /// Steuerbefehle: `SCHLIESSEN` meldet sauber Geschlossen,
    /// `FEHLER` meldet einen fatalen Fehler gefolgt von Geschlossen.
    struct AufzeichnungsAdapter {
        kanal: Arc<UdpKanal>,
        ereignisse: Arc<AdapterEreignisse>,
        senke: Arc<dyn Nachrichtensenke>,
        peer: SocketAddr,
        abbruch: CancellationToken,
        initialisiert: AtomicBool,
        entsorgt: AtomicBool,
    }

    fn aufzeichnungs_konstruktor(kontext: AdapterKontext) -> AdapterErzeugnis {
        let (ereignisse, rx) = AdapterEreignisse::neu();
        let adapter: Arc<dyn ProtokollAdapter> = Arc::new(AufzeichnungsAdapter {
            kanal: Arc::new(UdpKanal::neu(kontext.socket, kontext.peer)),
            ereignisse: Arc::new(ereignisse),
            senke: kontext.senke,
            peer: kontext.peer,
            abbruch: kontext.abbruch,
            initialisiert: AtomicBool::new(false),
            entsorgt: AtomicBool::new(false),
        });
        (adapter, rx)
    }

    #[async_trait]
    impl ProtokollAdapter for AufzeichnungsAdapter {
        fn kanal(&self) -> Arc<dyn Kanal> {
            self.kanal.clone()
        }

        fn init(&self) -> Result<(), AdapterFehler> {
            if self.initialisiert.swap(true, Ordering::SeqCst) {
                return Err(AdapterFehler::BereitsInitialisiert);
            }
            let kanal = self.kanal.clone();
            let ereignisse = self.ereignisse.clone();
            let senke = self.senke.clone();
            let peer = self.peer;
            let abbruch = self.abbruch.clone();

            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = abbruch.cancelled() => break,
                        nachricht = kanal.empfangen() => match nachricht {
                            None => break,
                            Some(bytes) => {
                                if bytes == b"SCHLIESSEN" {
                                    break;
                                }
                                if bytes == b"FEHLER" {
                                    ereignisse.fehler_melden(
                                        kanal.id(),
                                        AdapterFehler::Protokollverletzung("Testfehler".into()),
                                    );
                                    break;
                                }
                                let _ = senke
                                    .veroeffentlichen(
                                        &RessourcenId::neu("aufzeichnung"),
                                        &peer.to_string(),
                                        bytes,
                                    )
                                    .await;
                            }
                        }
                    }
                }
                let _ = kanal.schliessen().await;
                ereignisse.geschlossen_melden(kanal.id());
            });
            Ok(())
        }

        async fn entsorgen(&self) {
            if self.entsorgt.swap(true, Ordering::SeqCst) {
                return;
            }
            self.abbruch.cancel();
            let _ = self.kanal.schliessen().await;
        }
    }

    struct Aufbau {
        listener: Arc<GatewayListener>,
        adresse: SocketAddr,
        senke: Arc<AufzeichnungsSenke>,
    }

    async fn aufbauen() -> Aufbau {
        let registratur = Arc::new(AdapterRegistratur::neu());
        registratur.registrieren("aufzeichnung", Arc::new(aufzeichnungs_konstruktor));

        let senke = Arc::new(AufzeichnungsSenke::default());
        let konfig = ListenerKonfiguration {
            bind_adresse: localhost(0),
            protokoll: "aufzeichnung".into(),
            token_art: TokenArt::Jwt,
            max_datagramm_bytes: 1400,
            max_sessions: 64,
        };

        let listener = Arc::new(
            GatewayListener::binden(
                konfig,
                registratur,
                Arc::new(BasisAuthentifikator::neu()),
                senke.clone(),
            )
            .await
            .unwrap(),
        );
        let adresse = listener.lokale_adresse().unwrap();

        let loop_listener = listener.clone();
        tokio::spawn(async move {
            loop_listener.starten().await;
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        Aufbau {
            listener,
            adresse,
            senke,
        }
    }

    async fn warten_bis(bedingung: impl Fn() -> bool, beschreibung: &str) {
        for _ in 0..300 {
            if bedingung() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("Zeitlimit beim Warten auf: {beschreibung}");
    }

    #[tokio::test]
    async fn drei_datagramme_eine_session_in_reihenfolge() {
        let aufbau = aufbauen().await;

        let client = UdpSocket::bind(localhost(0)).await.unwrap();
        let client_addr = client.local_addr().unwrap();

        // Drei Datagramme bevor irgendeine Antwort kommt
        for inhalt in [b"eins".to_vec(), b"zwei".to_vec(), b"drei".to_vec()] {
            client.send_to(&inhalt, aufbau.adresse).await.unwrap();
        }

        let senke = aufbau.senke.clone();
        warten_bis(
            || senke.gesamt() == 3,
            "drei Zustellungen",
        )
        .await;

        // Genau eine Session, Nachrichten in Empfangs-Reihenfolge
        assert_eq!(aufbau.listener.cache().laenge(), 1);
        assert!(aufbau.listener.cache().ist_konsistent());
        assert_eq!(
            aufbau.senke.nachrichten_von(&client_addr.to_string()),
            vec![b"eins".to_vec(), b"zwei".to_vec(), b"drei".to_vec()]
        );

        // Adapter meldet Schliessen: Cache wird leer, kein Fehler
        client.send_to(b"SCHLIESSEN", aufbau.adresse).await.unwrap();
        let listener = aufbau.listener.clone();
        warten_bis(|| listener.cache().laenge() == 0, "Session-Abbau").await;
        assert!(aufbau.listener.cache().ist_konsistent());
    }

    #[tokio::test]
    async fn zwei_peers_sind_isoliert() {
        let aufbau = aufbauen().await;

        let client_a = UdpSocket::bind(localhost(0)).await.unwrap();
        let client_b = UdpSocket::bind(localhost(0)).await.unwrap();
        let addr_a = client_a.local_addr().unwrap().to_string();
        let addr_b = client_b.local_addr().unwrap().to_string();

        // Fuenf Datagramme pro Peer, verschraenkt
        for i in 0..5u8 {
            client_a
                .send_to(&[b'a', i], aufbau.adresse)
                .await
                .unwrap();
            client_b
                .send_to(&[b'b', i], aufbau.adresse)
                .await
                .unwrap();
        }

        let senke = aufbau.senke.clone();
        warten_bis(|| senke.gesamt() == 10, "zehn Zustellungen").await;

        assert_eq!(aufbau.listener.cache().laenge(), 2);
        assert!(aufbau.listener.cache().ist_konsistent());

        let von_a = aufbau.senke.nachrichten_von(&addr_a);
        let von_b = aufbau.senke.nachrichten_von(&addr_b);
        assert_eq!(von_a, (0..5u8).map(|i| vec![b'a', i]).collect::<Vec<_>>());
        assert_eq!(von_b, (0..5u8).map(|i| vec![b'b', i]).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn leeres_datagramm_erzeugt_keine_session() {
        let aufbau = aufbauen().await;

        let client = UdpSocket::bind(localhost(0)).await.unwrap();
        client.send_to(&[], aufbau.adresse).await.unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(aufbau.listener.cache().laenge(), 0);
        assert_eq!(aufbau.senke.gesamt(), 0);
    }

    #[tokio::test]
    async fn fataler_adapterfehler_baut_genau_einmal_ab() {
        let aufbau = aufbauen().await;

        let client = UdpSocket::bind(localhost(0)).await.unwrap();
        client.send_to(b"hallo", aufbau.adresse).await.unwrap();

        let listener = aufbau.listener.clone();
        warten_bis(|| listener.cache().laenge() == 1, "Session-Aufbau").await;

        // Der Adapter meldet Fehler UND Geschlossen fuer dieselbe Session
        client.send_to(b"FEHLER", aufbau.adresse).await.unwrap();
        warten_bis(|| listener.cache().laenge() == 0, "Session-Abbau").await;
        assert!(aufbau.listener.cache().ist_konsistent());

        // Ein paralleler Stopp findet nichts mehr zum Abbauen
        aufbau.listener.stoppen().await;
        assert_eq!(aufbau.listener.cache().laenge(), 0);
    }

    #[tokio::test]
    async fn stopp_leert_den_cache() {
        let aufbau = aufbauen().await;

        let client_a = UdpSocket::bind(localhost(0)).await.unwrap();
        let client_b = UdpSocket::bind(localhost(0)).await.unwrap();
        client_a.send_to(b"a", aufbau.adresse).await.unwrap();
        client_b.send_to(b"b", aufbau.adresse).await.unwrap();

        let listener = aufbau.listener.clone();
        warten_bis(|| listener.cache().laenge() == 2, "zwei Sessions").await;

        aufbau.listener.stoppen().await;

        // Nach dem Stopp: Cache leer und konsistent, weitere Datagramme
        // erreichen den beendeten Loop nicht mehr
        assert_eq!(aufbau.listener.cache().laenge(), 0);
        assert!(aufbau.listener.cache().ist_konsistent());

        client_a.send_to(b"nachzuegler", aufbau.adresse).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(aufbau.listener.cache().laenge(), 0);
    }

    #[tokio::test]
    async fn unbekanntes_protokoll_meldet_listener_fehler() {
        let registratur = Arc::new(AdapterRegistratur::neu());
        let senke = Arc::new(AufzeichnungsSenke::default());
        let mut konfig = ListenerKonfiguration::neu(localhost(0));
        konfig.protokoll = "niemals-registriert".into();

        let listener = Arc::new(
            GatewayListener::binden(
                konfig,
                registratur,
                Arc::new(BasisAuthentifikator::neu()),
                senke,
            )
            .await
            .unwrap(),
        );
        let adresse = listener.lokale_adresse().unwrap();
        let mut fehler_rx = listener.abonnieren_fehler();

        let loop_listener = listener.clone();
        tokio::spawn(async move {
            loop_listener.starten().await;
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        let client = UdpSocket::bind(localhost(0)).await.unwrap();
        client.send_to(b"hallo", adresse).await.unwrap();

        // Der Fehler wird gemeldet, der Loop laeuft weiter
        let meldung = tokio::time::timeout(Duration::from_secs(2), fehler_rx.recv())
            .await
            .expect("Zeitlimit beim Warten auf Fehlermeldung")
            .unwrap();
        assert!(meldung.nachricht.contains("niemals-registriert"));
        assert_eq!(listener.cache().laenge(), 0);

        // Der Loop lebt noch: ein zweites Datagramm meldet erneut
        client.send_to(b"nochmal", adresse).await.unwrap();
        let zweite = tokio::time::timeout(Duration::from_secs(2), fehler_rx.recv())
            .await
            .expect("Zeitlimit bei zweiter Fehlermeldung")
            .unwrap();
        assert_eq!(zweite.peer, Some(client.local_addr().unwrap()));
    }
}
