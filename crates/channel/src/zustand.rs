//! Kanal-Zustandsmaschine
//!
//! ```text
//! Geschlossen -> Oeffnet -> Offen -> Schliesst -> Geschlossen
//!                   |          |
//!                   v          v
//!                 Gestoert -> Geschlossen
//! ```
//!
//! Ein sauberer Abbau laeuft immer ueber `Schliesst`. `Gestoert` ist
//! nur aus `Oeffnet` und `Offen` erreichbar (unbehebbarer
//! Transportfehler) und faellt direkt auf `Geschlossen` zurueck.

/// Lebenszyklus-Zustand eines Kanals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KanalZustand {
    /// Kein Transport vorbereitet
    Geschlossen,
    /// Transport wird vorbereitet
    Oeffnet,
    /// Nachrichten koennen fliessen
    Offen,
    /// Sauberer Abbau laeuft
    Schliesst,
    /// Unbehebbarer Transportfehler
    Gestoert,
}

impl KanalZustand {
    /// Prueft ob ein Zustandsuebergang erlaubt ist
    pub fn uebergang_gueltig(von: KanalZustand, nach: KanalZustand) -> bool {
        use KanalZustand::*;
        matches!(
            (von, nach),
            (Geschlossen, Oeffnet)
                | (Oeffnet, Offen)
                | (Oeffnet, Schliesst)
                | (Oeffnet, Gestoert)
                | (Offen, Schliesst)
                | (Offen, Gestoert)
                | (Schliesst, Geschlossen)
                | (Gestoert, Geschlossen)
        )
    }

    /// Gibt true zurueck wenn der Kanal Nachrichten annehmen kann
    pub fn ist_offen(&self) -> bool {
        matches!(self, Self::Offen)
    }
}

impl std::fmt::Display for KanalZustand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Geschlossen => "geschlossen",
            Self::Oeffnet => "oeffnet",
            Self::Offen => "offen",
            Self::Schliesst => "schliesst",
            Self::Gestoert => "gestoert",
        };
        write!(f, "{name}")
    }
}
