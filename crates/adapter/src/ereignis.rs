//! Aufwaerts-Ereignisse eines Adapters
//!
//! Der Listener abonniert bei der Erzeugung (vor dem Kanal-Oeffnen)
//! den einen Ereignis-Empfaenger und treibt damit den Session-Abbau.
//! `Geschlossen` ist das Terminal-Ereignis und wird pro Session genau
//! einmal gemeldet, egal wie viele Abbau-Pfade gleichzeitig feuern.

use kurier_core::types::KanalId;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;

use crate::error::AdapterFehler;

/// Ereignisse die ein Adapter nach oben meldet
#[derive(Debug)]
pub enum AdapterEreignis {
    /// Fehler; `fehler.ist_fatal()` entscheidet ueber den Abbau
    Fehler {
        kanal_id: KanalId,
        fehler: AdapterFehler,
    },
    /// Terminal: die Session ist beendet
    Geschlossen { kanal_id: KanalId },
}

/// Sende-Seite der Adapter-Ereignisse mit Terminal-Sperre
pub struct AdapterEreignisse {
    tx: mpsc::UnboundedSender<AdapterEreignis>,
    terminal_gemeldet: AtomicBool,
}

impl AdapterEreignisse {
    /// Erstellt Sender und den einen Empfaenger
    pub fn neu() -> (Self, mpsc::UnboundedReceiver<AdapterEreignis>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                terminal_gemeldet: AtomicBool::new(false),
            },
            rx,
        )
    }

    /// Meldet einen Fehler (blockiert nie)
    pub fn fehler_melden(&self, kanal_id: KanalId, fehler: AdapterFehler) {
        let _ = self.tx.send(AdapterEreignis::Fehler { kanal_id, fehler });
    }

    /// Meldet das Terminal-Ereignis; nur der erste Aufruf feuert
    ///
    /// Gibt true zurueck wenn dieser Aufruf das Ereignis ausgeloest hat.
    pub fn geschlossen_melden(&self, kanal_id: KanalId) -> bool {
        if self.terminal_gemeldet.swap(true, Ordering::SeqCst) {
            return false;
        }
        let _ = self.tx.send(AdapterEreignis::Geschlossen { kanal_id });
        true
    }

    /// True wenn das Terminal-Ereignis bereits gemeldet wurde
    pub fn ist_terminal(&self) -> bool {
        self.terminal_gemeldet.load(Ordering::SeqCst)
    }
}
