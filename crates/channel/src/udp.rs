//! UDP-Bindung – Kanal ueber einen geteilten Datagramm-Socket
//!
//! Alle Kanaele eines Listeners teilen sich den gebundenen Socket;
//! ausgehende Nachrichten gehen via `send_to` an die Peer-Adresse,
//! eingehende Datagramme reiht der Listener ueber
//! `nachricht_einreihen` ein (FIFO pro Kanal).

use async_trait::async_trait;
use kurier_core::types::KanalId;
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

use crate::ereignis::{KanalEreignisse, ZustandsWechsel};
use crate::kanal::{Kanal, KanalFehler};
use crate::zustand::KanalZustand;

/// Kanal ueber einen geteilten UDP-Socket
pub struct UdpKanal {
    id: KanalId,
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
    zustand: Mutex<KanalZustand>,
    authentifiziert: AtomicBool,
    verschluesselt: AtomicBool,
    eingang_tx: Mutex<Option<mpsc::UnboundedSender<Vec<u8>>>>,
    eingang_rx: tokio::sync::Mutex<Option<mpsc::UnboundedReceiver<Vec<u8>>>>,
    ereignisse: KanalEreignisse,
}

impl UdpKanal {
    /// Erstellt einen neuen, noch geschlossenen Kanal
    pub fn neu(socket: Arc<UdpSocket>, peer: SocketAddr) -> Self {
        Self {
            id: KanalId::new(),
            socket,
            peer,
            zustand: Mutex::new(KanalZustand::Geschlossen),
            authentifiziert: AtomicBool::new(false),
            verschluesselt: AtomicBool::new(false),
            eingang_tx: Mutex::new(None),
            eingang_rx: tokio::sync::Mutex::new(None),
            ereignisse: KanalEreignisse::neu(),
        }
    }

    /// Peer-Adresse dieses Kanals
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Setzt das Verschluesselungs-Flag (z.B. nach DTLS-Handshake)
    pub fn verschluesselt_setzen(&self, wert: bool) {
        self.verschluesselt.store(wert, Ordering::SeqCst);
    }

    /// Fuehrt einen validierten Zustandsuebergang aus und meldet ihn
    fn zustand_wechseln(&self, nach: KanalZustand) -> Result<(), KanalFehler> {
        let von = {
            let mut zustand = self.zustand.lock();
            let von = *zustand;
            if !KanalZustand::uebergang_gueltig(von, nach) {
                return Err(KanalFehler::UngueltigerUebergang { von, nach });
            }
            *zustand = nach;
            von
        };
        self.ereignisse.melden_zustand(ZustandsWechsel {
            kanal_id: self.id,
            von,
            nach,
        });
        tracing::trace!(kanal = %self.id, von = %von, nach = %nach, "Zustandswechsel");
        Ok(())
    }

    /// Schliesst die Eingangs-Queue (weckt wartende `empfangen`-Aufrufer)
    fn queue_schliessen(&self) {
        self.eingang_tx.lock().take();
    }
}

#[async_trait]
impl Kanal for UdpKanal {
    fn id(&self) -> KanalId {
        self.id
    }

    fn port(&self) -> u16 {
        self.peer.port()
    }

    fn zustand(&self) -> KanalZustand {
        *self.zustand.lock()
    }

    fn ist_verbunden(&self) -> bool {
        self.zustand().ist_offen()
    }

    fn ist_verschluesselt(&self) -> bool {
        self.verschluesselt.load(Ordering::SeqCst)
    }

    fn ist_authentifiziert(&self) -> bool {
        self.authentifiziert.load(Ordering::SeqCst)
    }

    fn authentifiziert_setzen(&self, wert: bool) {
        self.authentifiziert.store(wert, Ordering::SeqCst);
    }

    fn ereignisse(&self) -> &KanalEreignisse {
        &self.ereignisse
    }

    async fn oeffnen(&self) -> Result<(), KanalFehler> {
        if self.zustand().ist_offen() {
            return Ok(());
        }

        self.zustand_wechseln(KanalZustand::Oeffnet)?;

        // Eingangs-Queue anlegen (FIFO, unbounded: der Listener darf
        // beim Einreihen nie blockieren)
        let (tx, rx) = mpsc::unbounded_channel();
        *self.eingang_tx.lock() = Some(tx);
        *self.eingang_rx.lock().await = Some(rx);

        self.zustand_wechseln(KanalZustand::Offen)?;
        self.ereignisse.melden_geoeffnet(self.id);
        tracing::debug!(kanal = %self.id, peer = %self.peer, "Kanal geoeffnet");
        Ok(())
    }

    async fn senden(&self, nachricht: &[u8]) -> Result<(), KanalFehler> {
        if !self.ist_verbunden() {
            return Err(KanalFehler::NichtVerbunden(self.id));
        }

        match self.socket.send_to(nachricht, self.peer).await {
            Ok(_) => {
                self.ereignisse.melden_gesendet(self.id, nachricht.len());
                tracing::trace!(
                    kanal = %self.id,
                    bytes = nachricht.len(),
                    peer = %self.peer,
                    "Datagramm gesendet"
                );
                Ok(())
            }
            Err(e) => {
                self.ereignisse
                    .melden_fehler(self.id, format!("Sendefehler: {e}"));
                Err(KanalFehler::Transport(e))
            }
        }
    }

    async fn nachricht_einreihen(&self, nachricht: Vec<u8>) -> Result<(), KanalFehler> {
        if !self.ist_verbunden() {
            return Err(KanalFehler::Geschlossen(self.id));
        }

        let bytes = nachricht.len();
        let tx = self.eingang_tx.lock().clone();
        match tx {
            Some(tx) if tx.send(nachricht).is_ok() => {
                self.ereignisse.melden_empfangen(self.id, bytes);
                Ok(())
            }
            _ => Err(KanalFehler::Geschlossen(self.id)),
        }
    }

    async fn empfangen(&self) -> Option<Vec<u8>> {
        let mut guard = self.eingang_rx.lock().await;
        match guard.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }

    async fn schliessen(&self) -> Result<(), KanalFehler> {
        match self.zustand() {
            // Idempotent
            KanalZustand::Geschlossen | KanalZustand::Schliesst => return Ok(()),
            KanalZustand::Gestoert => {
                if self.zustand_wechseln(KanalZustand::Geschlossen).is_err() {
                    // Paralleler Abbau hat gewonnen
                    return Ok(());
                }
            }
            KanalZustand::Offen | KanalZustand::Oeffnet => {
                // Sauberer Abbau laeuft immer ueber Schliesst
                if self.zustand_wechseln(KanalZustand::Schliesst).is_err() {
                    // Paralleler Abbau hat gewonnen
                    return Ok(());
                }
                self.zustand_wechseln(KanalZustand::Geschlossen)?;
            }
        }

        self.queue_schliessen();
        self.ereignisse.melden_geschlossen(self.id);
        tracing::debug!(kanal = %self.id, peer = %self.peer, "Kanal geschlossen");
        Ok(())
    }

    async fn stoeren(&self, grund: &str) {
        match self.zustand() {
            KanalZustand::Oeffnet | KanalZustand::Offen => {}
            // Bereits im Abbau – nichts zu melden
            _ => return,
        }

        if self.zustand_wechseln(KanalZustand::Gestoert).is_ok() {
            self.ereignisse.melden_fehler(self.id, grund);
            tracing::warn!(kanal = %self.id, peer = %self.peer, grund, "Kanal gestoert");
            let _ = self.zustand_wechseln(KanalZustand::Geschlossen);
            self.queue_schliessen();
            self.ereignisse.melden_geschlossen(self.id);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
