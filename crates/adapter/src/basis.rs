//! Basis-Adapter – bindet einen Kanal an das Kurier Basis-Protokoll
//!
//! ## Ablauf
//!
//! ```text
//! Verbinden(token) --> Authentifikator --> VerbindenBestaetigt
//!      |                                        |
//!      v (ungueltig)                            v
//! Fehler + Geschlossen              Veroeffentlichen -> Senke -> Bestaetigung
//!                                   Ping -> Pong
//!                                   Trennen -> Geschlossen
//! ```
//!
//! Vor erfolgreicher Authentifizierung wird ausser `Verbinden` nichts
//! akzeptiert; jede andere Nachricht ist eine fatale
//! Protokollverletzung. Nach der Authentifizierung beendet eine
//! einzelne undekodierbare Nachricht die Session nicht.

use kurier_auth::{Authentifikator, TokenArt};
use kurier_channel::{Kanal, UdpKanal};
use kurier_core::Nachrichtensenke;
use kurier_protocol::rahmen::{FehlerCode, GatewayRahmen};
use kurier_protocol::wire;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::adapter::ProtokollAdapter;
use crate::ereignis::AdapterEreignisse;
use crate::error::AdapterFehler;
use crate::registratur::{AdapterErzeugnis, AdapterKontext};

use async_trait::async_trait;

// ---------------------------------------------------------------------------
// BasisAdapter
// ---------------------------------------------------------------------------

/// Adapter fuer das first-party Basis-Protokoll
pub struct BasisAdapter {
    kanal: Arc<UdpKanal>,
    ereignisse: Arc<AdapterEreignisse>,
    authentifikator: Arc<dyn Authentifikator>,
    token_art: TokenArt,
    senke: Arc<dyn Nachrichtensenke>,
    abbruch: CancellationToken,
    max_datagramm: usize,
    initialisiert: AtomicBool,
    entsorgt: AtomicBool,
}

impl BasisAdapter {
    /// Konstruktor fuer die Registratur (reine Konstruktion, kein I/O)
    pub fn neu(kontext: AdapterKontext) -> AdapterErzeugnis {
        let (ereignisse, rx) = AdapterEreignisse::neu();
        let adapter: Arc<dyn ProtokollAdapter> = Arc::new(Self {
            kanal: Arc::new(UdpKanal::neu(kontext.socket, kontext.peer)),
            ereignisse: Arc::new(ereignisse),
            authentifikator: kontext.authentifikator,
            token_art: kontext.token_art,
            senke: kontext.senke,
            abbruch: kontext.abbruch,
            max_datagramm: kontext.max_datagramm_bytes,
            initialisiert: AtomicBool::new(false),
            entsorgt: AtomicBool::new(false),
        });
        (adapter, rx)
    }
}

#[async_trait]
impl ProtokollAdapter for BasisAdapter {
    fn kanal(&self) -> Arc<dyn Kanal> {
        self.kanal.clone()
    }

    fn init(&self) -> Result<(), AdapterFehler> {
        if self.initialisiert.swap(true, Ordering::SeqCst) {
            return Err(AdapterFehler::BereitsInitialisiert);
        }

        let verarbeitung = Verarbeitung {
            kanal: self.kanal.clone(),
            ereignisse: self.ereignisse.clone(),
            authentifikator: self.authentifikator.clone(),
            token_art: self.token_art,
            senke: self.senke.clone(),
            abbruch: self.abbruch.clone(),
            max_datagramm: self.max_datagramm,
        };
        tokio::spawn(verarbeitung.ausfuehren());
        Ok(())
    }

    async fn entsorgen(&self) {
        if self.entsorgt.swap(true, Ordering::SeqCst) {
            return;
        }
        self.abbruch.cancel();
        let _ = self.kanal.schliessen().await;
        tracing::debug!(kanal = %self.kanal.id(), "Adapter entsorgt");
    }
}

// ---------------------------------------------------------------------------
// Verarbeitungs-Schleife
// ---------------------------------------------------------------------------

/// Ergebnis eines Verarbeitungsschritts
enum Ablauf {
    Weiter,
    Beenden,
}

/// Laeuft als eigener Task pro Session, unabhaengig vom Listener
struct Verarbeitung {
    kanal: Arc<UdpKanal>,
    ereignisse: Arc<AdapterEreignisse>,
    authentifikator: Arc<dyn Authentifikator>,
    token_art: TokenArt,
    senke: Arc<dyn Nachrichtensenke>,
    abbruch: CancellationToken,
    max_datagramm: usize,
}

impl Verarbeitung {
    async fn ausfuehren(self) {
        // Authentifizierte Identitaet; None bis zum Handshake
        let mut identitaet: Option<String> = None;

        loop {
            tokio::select! {
                _ = self.abbruch.cancelled() => {
                    tracing::debug!(kanal = %self.kanal.id(), "Session abgebrochen");
                    break;
                }
                nachricht = self.kanal.empfangen() => {
                    match nachricht {
                        None => break,
                        Some(bytes) => {
                            if let Ablauf::Beenden =
                                self.nachricht_verarbeiten(&bytes, &mut identitaet).await
                            {
                                break;
                            }
                        }
                    }
                }
            }
        }

        // Terminal-Pfad: Kanal zu, genau ein Geschlossen-Ereignis
        let _ = self.kanal.schliessen().await;
        self.ereignisse.geschlossen_melden(self.kanal.id());
        tracing::debug!(kanal = %self.kanal.id(), "Verarbeitungs-Schleife beendet");
    }

    async fn nachricht_verarbeiten(
        &self,
        bytes: &[u8],
        identitaet: &mut Option<String>,
    ) -> Ablauf {
        let rahmen = match wire::dekodieren(bytes, self.max_datagramm) {
            Ok(rahmen) => rahmen,
            Err(e) if identitaet.is_some() => {
                // Einzelne kaputte Nachricht auf etablierter Session
                self.ereignisse.fehler_melden(
                    self.kanal.id(),
                    AdapterFehler::Dekodierung(e.to_string()),
                );
                let _ = self
                    .antworten(&GatewayRahmen::fehler(FehlerCode::InvalidFrame, e.to_string()))
                    .await;
                return Ablauf::Weiter;
            }
            Err(e) => {
                // Vor dem Handshake gibt es nichts zu retten
                self.ereignisse.fehler_melden(
                    self.kanal.id(),
                    AdapterFehler::Protokollverletzung(format!(
                        "undekodierbarer Rahmen vor Authentifizierung: {e}"
                    )),
                );
                return Ablauf::Beenden;
            }
        };

        match rahmen {
            GatewayRahmen::Verbinden { token } => self.verbinden(&token, identitaet).await,

            _ if identitaet.is_none() => {
                self.ereignisse.fehler_melden(
                    self.kanal.id(),
                    AdapterFehler::Protokollverletzung(
                        "erster Rahmen muss Verbinden sein".into(),
                    ),
                );
                let _ = self
                    .antworten(&GatewayRahmen::fehler(
                        FehlerCode::NotAuthenticated,
                        "nicht authentifiziert",
                    ))
                    .await;
                Ablauf::Beenden
            }

            GatewayRahmen::Veroeffentlichen {
                ressource,
                sequenz,
                nutzdaten,
            } => {
                let absender = identitaet.as_deref().unwrap_or_default();
                if let Err(e) = self
                    .senke
                    .veroeffentlichen(&ressource, absender, nutzdaten)
                    .await
                {
                    self.ereignisse
                        .fehler_melden(self.kanal.id(), AdapterFehler::Senke(e.to_string()));
                    return Ablauf::Weiter;
                }
                match self
                    .antworten(&GatewayRahmen::Bestaetigung { sequenz })
                    .await
                {
                    Ok(()) => Ablauf::Weiter,
                    Err(()) => Ablauf::Beenden,
                }
            }

            GatewayRahmen::Ping { zeitstempel } => {
                match self.antworten(&GatewayRahmen::Pong { zeitstempel }).await {
                    Ok(()) => Ablauf::Weiter,
                    Err(()) => Ablauf::Beenden,
                }
            }

            GatewayRahmen::Trennen { grund } => {
                tracing::info!(
                    kanal = %self.kanal.id(),
                    grund = grund.as_deref().unwrap_or("-"),
                    "Gegenstelle trennt"
                );
                Ablauf::Beenden
            }

            // Nur-ausgehende Rahmen von der Gegenstelle: verwerfen
            GatewayRahmen::VerbindenBestaetigt { .. }
            | GatewayRahmen::Bestaetigung { .. }
            | GatewayRahmen::Fehler { .. }
            | GatewayRahmen::Pong { .. } => {
                self.ereignisse.fehler_melden(
                    self.kanal.id(),
                    AdapterFehler::Dekodierung("unerwarteter Rahmen".into()),
                );
                Ablauf::Weiter
            }
        }
    }

    /// Handshake: Token pruefen, Flag setzen, bestaetigen
    async fn verbinden(&self, token: &str, identitaet: &mut Option<String>) -> Ablauf {
        match self
            .authentifikator
            .validieren(token.as_bytes(), self.token_art)
            .await
        {
            Ok(ergebnis) => {
                self.kanal.authentifiziert_setzen(true);
                *identitaet = Some(ergebnis.identitaet.clone());
                tracing::info!(
                    kanal = %self.kanal.id(),
                    identitaet = %ergebnis.identitaet,
                    ansprueche = ergebnis.ansprueche.len(),
                    "Gegenstelle authentifiziert"
                );
                match self
                    .antworten(&GatewayRahmen::VerbindenBestaetigt {
                        identitaet: ergebnis.identitaet,
                    })
                    .await
                {
                    Ok(()) => Ablauf::Weiter,
                    Err(()) => Ablauf::Beenden,
                }
            }
            Err(e) => {
                self.ereignisse.fehler_melden(
                    self.kanal.id(),
                    AdapterFehler::Authentifizierung(e.to_string()),
                );
                let _ = self
                    .antworten(&GatewayRahmen::fehler(
                        FehlerCode::InvalidCredentials,
                        "Token ungueltig",
                    ))
                    .await;
                Ablauf::Beenden
            }
        }
    }

    /// Sendet einen Rahmen; ein Transportfehler stoert den Kanal
    async fn antworten(&self, rahmen: &GatewayRahmen) -> Result<(), ()> {
        let datagramm = match wire::kodieren(rahmen, self.max_datagramm) {
            Ok(datagramm) => datagramm,
            Err(e) => {
                tracing::warn!(kanal = %self.kanal.id(), fehler = %e, "Antwort nicht kodierbar");
                return Ok(());
            }
        };

        if let Err(e) = self.kanal.senden(&datagramm).await {
            self.ereignisse
                .fehler_melden(self.kanal.id(), AdapterFehler::Transport(e.to_string()));
            self.kanal.stoeren("Senden fehlgeschlagen").await;
            return Err(());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
