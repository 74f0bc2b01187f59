//! Kanal-Ereignisse – Broadcast pro Ereignisart
//!
//! Jede Ereignisart hat ihren eigenen `tokio::sync::broadcast`-Kanal.
//! Mehrere unabhaengige Beobachter koennen abonnieren; das Melden
//! blockiert nie (Fire-and-Forget – ein `send` ohne Empfaenger wird
//! stillschweigend verworfen).

use kurier_core::types::{KanalId, RessourcenId};
use tokio::sync::broadcast;

use crate::zustand::KanalZustand;

/// Puffergroesse der Broadcast-Kanaele
const EREIGNIS_PUFFER: usize = 64;

// ---------------------------------------------------------------------------
// Ereignis-Nutzdaten
// ---------------------------------------------------------------------------

/// Zustandswechsel eines Kanals
#[derive(Debug, Clone, Copy)]
pub struct ZustandsWechsel {
    pub kanal_id: KanalId,
    pub von: KanalZustand,
    pub nach: KanalZustand,
}

/// Eingegangene Nachricht (Groesse, nicht die Nutzdaten selbst)
#[derive(Debug, Clone, Copy)]
pub struct EmpfangsMeldung {
    pub kanal_id: KanalId,
    pub bytes: usize,
}

/// Gesendete Nachricht
#[derive(Debug, Clone, Copy)]
pub struct SendeMeldung {
    pub kanal_id: KanalId,
    pub bytes: usize,
}

/// Kanal-Fehler als Meldung (Fehlertypen sind nicht Clone)
#[derive(Debug, Clone)]
pub struct FehlerMeldung {
    pub kanal_id: KanalId,
    pub nachricht: String,
}

/// Beobachtungs-Meldung (Observe-Semantik mancher Protokolle)
#[derive(Debug, Clone)]
pub struct BeobachtungsMeldung {
    pub kanal_id: KanalId,
    pub ressource: RessourcenId,
}

// ---------------------------------------------------------------------------
// KanalEreignisse
// ---------------------------------------------------------------------------

/// Buendelt alle Ereignisarten eines Kanals
///
/// `melden_*` feuert das Ereignis, `abonnieren_*` haengt einen neuen
/// Beobachter an. Beobachter die nicht mithalten verlieren alte
/// Ereignisse (broadcast lagged) – ein Kanal wartet nie auf sie.
pub struct KanalEreignisse {
    empfangen: broadcast::Sender<EmpfangsMeldung>,
    geoeffnet: broadcast::Sender<KanalId>,
    geschlossen: broadcast::Sender<KanalId>,
    fehler: broadcast::Sender<FehlerMeldung>,
    zustand_geaendert: broadcast::Sender<ZustandsWechsel>,
    wiederholung: broadcast::Sender<KanalId>,
    gesendet: broadcast::Sender<SendeMeldung>,
    beobachtet: broadcast::Sender<BeobachtungsMeldung>,
}

impl KanalEreignisse {
    /// Erstellt die Ereignis-Kanaele
    pub fn neu() -> Self {
        Self {
            empfangen: broadcast::channel(EREIGNIS_PUFFER).0,
            geoeffnet: broadcast::channel(EREIGNIS_PUFFER).0,
            geschlossen: broadcast::channel(EREIGNIS_PUFFER).0,
            fehler: broadcast::channel(EREIGNIS_PUFFER).0,
            zustand_geaendert: broadcast::channel(EREIGNIS_PUFFER).0,
            wiederholung: broadcast::channel(EREIGNIS_PUFFER).0,
            gesendet: broadcast::channel(EREIGNIS_PUFFER).0,
            beobachtet: broadcast::channel(EREIGNIS_PUFFER).0,
        }
    }

    // --- Melden (blockiert nie) ---

    pub fn melden_empfangen(&self, kanal_id: KanalId, bytes: usize) {
        let _ = self.empfangen.send(EmpfangsMeldung { kanal_id, bytes });
    }

    pub fn melden_geoeffnet(&self, kanal_id: KanalId) {
        let _ = self.geoeffnet.send(kanal_id);
    }

    pub fn melden_geschlossen(&self, kanal_id: KanalId) {
        let _ = self.geschlossen.send(kanal_id);
    }

    pub fn melden_fehler(&self, kanal_id: KanalId, nachricht: impl Into<String>) {
        let _ = self.fehler.send(FehlerMeldung {
            kanal_id,
            nachricht: nachricht.into(),
        });
    }

    pub fn melden_zustand(&self, wechsel: ZustandsWechsel) {
        let _ = self.zustand_geaendert.send(wechsel);
    }

    pub fn melden_wiederholung(&self, kanal_id: KanalId) {
        let _ = self.wiederholung.send(kanal_id);
    }

    pub fn melden_gesendet(&self, kanal_id: KanalId, bytes: usize) {
        let _ = self.gesendet.send(SendeMeldung { kanal_id, bytes });
    }

    pub fn melden_beobachtet(&self, kanal_id: KanalId, ressource: RessourcenId) {
        let _ = self.beobachtet.send(BeobachtungsMeldung {
            kanal_id,
            ressource,
        });
    }

    // --- Abonnieren ---

    pub fn abonnieren_empfangen(&self) -> broadcast::Receiver<EmpfangsMeldung> {
        self.empfangen.subscribe()
    }

    pub fn abonnieren_geoeffnet(&self) -> broadcast::Receiver<KanalId> {
        self.geoeffnet.subscribe()
    }

    pub fn abonnieren_geschlossen(&self) -> broadcast::Receiver<KanalId> {
        self.geschlossen.subscribe()
    }

    pub fn abonnieren_fehler(&self) -> broadcast::Receiver<FehlerMeldung> {
        self.fehler.subscribe()
    }

    pub fn abonnieren_zustand(&self) -> broadcast::Receiver<ZustandsWechsel> {
        self.zustand_geaendert.subscribe()
    }

    pub fn abonnieren_wiederholung(&self) -> broadcast::Receiver<KanalId> {
        self.wiederholung.subscribe()
    }

    pub fn abonnieren_gesendet(&self) -> broadcast::Receiver<SendeMeldung> {
        self.gesendet.subscribe()
    }

    pub fn abonnieren_beobachtet(&self) -> broadcast::Receiver<BeobachtungsMeldung> {
        self.beobachtet.subscribe()
    }
}

impl Default for KanalEreignisse {
    fn default() -> Self {
        Self::neu()
    }
}
