//! kurier-server – Bibliotheks-Root
//!
//! Deklariert die Server-Module und verdrahtet die Subsysteme:
//! Authentifikator aus der Sicherheits-Sektion, Adapter-Registratur,
//! Identitaets-Speicher und den Gateway-Listener.

pub mod config;

use anyhow::Result;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use kurier_adapter::AdapterRegistratur;
use kurier_auth::{BasisAuthentifikator, TokenArt};
use kurier_core::ProtokollSenke;
use kurier_gateway::{GatewayListener, ListenerKonfiguration};
use kurier_identity::{IdentitaetsSpeicher, IdentitaetsUmgebung};

use config::GatewayKonfiguration;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub konfig: GatewayKonfiguration,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(konfig: GatewayKonfiguration) -> Self {
        Self { konfig }
    }

    /// Startet alle Subsysteme und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Authentifikator aus der Sicherheits-Sektion bauen
    /// 2. Identitaets-Speicher laden und Dienst-Identitaet initialisieren
    /// 3. Adapter-Registratur mit dem Basis-Protokoll fuellen
    /// 4. Gateway-Listener binden und Empfangs-Loop starten
    /// 5. Auf Ctrl-C warten, dann Listener stoppen und Speicher persistieren
    pub async fn starten(self) -> Result<()> {
        tracing::info!(
            server_name = %self.konfig.server.name,
            udp = %self.konfig.udp_bind_adresse(),
            protokoll = %self.konfig.protokoll.standard,
            "Gateway startet"
        );

        // Authentifikator aus der Konfiguration
        let token_art: TokenArt = self.konfig.sicherheit.token_art.parse()?;
        let mut authentifikator = BasisAuthentifikator::neu();
        authentifikator.hinzufuegen(
            token_art,
            &self.konfig.sicherheit.symmetrischer_schluessel,
            &self.konfig.sicherheit.aussteller,
            &self.konfig.sicherheit.zielgruppe,
        );

        // Identitaets-Speicher (Umgebung + optionale Persistenz)
        let identitaeten = IdentitaetsSpeicher::neu(
            self.konfig
                .identitaet
                .persistenz_pfad
                .as_ref()
                .map(PathBuf::from),
            IdentitaetsUmgebung::aus_env(),
        )?;
        let dienst_name = &self.konfig.identitaet.dienst_name;
        identitaeten.initialisierung_sicherstellen(dienst_name);
        tracing::info!(
            dienst = %dienst_name,
            ansprueche = identitaeten
                .ansprueche_holen(dienst_name)
                .map(|a| a.len())
                .unwrap_or(0),
            zertifikat = identitaeten.zertifikat_holen(dienst_name).is_some(),
            "Dienst-Identitaet bereit"
        );

        // Registratur und Senke
        let registratur = Arc::new(AdapterRegistratur::mit_basis());
        let senke = Arc::new(ProtokollSenke);

        // Listener binden
        let bind_adresse: SocketAddr = self.konfig.udp_bind_adresse().parse()?;
        let listener = Arc::new(
            GatewayListener::binden(
                ListenerKonfiguration {
                    bind_adresse,
                    protokoll: self.konfig.protokoll.standard.clone(),
                    token_art,
                    max_datagramm_bytes: self.konfig.netzwerk.max_datagramm_bytes,
                    max_sessions: self.konfig.server.max_sessions,
                },
                registratur,
                Arc::new(authentifikator),
                senke,
            )
            .await?,
        );

        let loop_listener = listener.clone();
        let empfangs_task = tokio::spawn(async move {
            loop_listener.starten().await;
        });

        tracing::info!("Gateway laeuft. Warte auf Shutdown-Signal (Ctrl-C)...");
        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutdown-Signal empfangen, Gateway wird beendet");

        listener.stoppen().await;
        empfangs_task.await?;
        identitaeten.deaktivieren()?;

        Ok(())
    }
}
