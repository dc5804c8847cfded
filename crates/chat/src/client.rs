//! Chat-Sitzung: Sockets, Konfiguration und Versand
//!
//! Der `ChatClient` ist die Kompositionswurzel des Kerns: er besitzt den
//! Sende-Socket, den (multicast-faehigen) Empfangs-Socket samt
//! Empfangs-Schleife und das Kanal-Register. Die ausgelagerte
//! Oberflaeche liefert nur eine [`Configuration`] und einen Callback und
//! bekommt dekodierte [`ChatEntry`]s zurueck.
//!
//! `konfigurieren` ist eine sequentielle Uebergabe: die alte Schleife
//! wird vollstaendig gestoppt bevor der neue Socket gebunden wird.
//! Gleichzeitige Aufrufe aus mehreren Tasks sind nicht vorgesehen; der
//! Aufrufer muss sie serialisieren.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use tokio::net::UdpSocket;

use flurfunk_core::Configuration;
use flurfunk_protocol::ChatMessage;

use crate::channel::{Channel, ChannelRegistry};
use crate::entry::ChatEntry;
use crate::error::ChatResult;
use crate::receiver::{ChatReceiver, EntryCallback};

// ---------------------------------------------------------------------------
// ChatClient
// ---------------------------------------------------------------------------

/// Eine Chat-Sitzung ueber einen UDP-Endpunkt
pub struct ChatClient {
    register: Arc<ChannelRegistry>,
    config: Configuration,
    callback: EntryCallback,
    sende_socket: Option<UdpSocket>,
    empfaenger: Option<ChatReceiver>,
}

impl ChatClient {
    /// Erstellt eine Sitzung mit leerem Register und Standard-Konfiguration
    ///
    /// Bis zum ersten `konfigurieren` laeuft kein Empfaenger; Senden ist
    /// trotzdem moeglich (der Sende-Socket wird bei Bedarf geoeffnet).
    pub fn neu() -> Self {
        Self {
            register: Arc::new(ChannelRegistry::neu()),
            config: Configuration::default(),
            callback: Arc::new(|_| {}),
            sende_socket: None,
            empfaenger: None,
        }
    }

    /// Das Kanal-Register dieser Sitzung
    ///
    /// Hierueber legt die Oberflaeche Kanaele an (`kanal_aus_name` /
    /// `kanal_aus_geschuetztem_namen`).
    pub fn register(&self) -> &Arc<ChannelRegistry> {
        &self.register
    }

    /// Aktuelle Konfiguration der Sitzung
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Meldet ob gerade eine Empfangs-Schleife laeuft
    pub fn empfaengt(&self) -> bool {
        self.empfaenger.as_ref().is_some_and(|e| e.ist_aktiv())
    }

    /// Registriert den Callback fuer dekodierte Eintraege
    ///
    /// Wirkt sofort auf eine laufende Empfangs-Schleife und wird bei
    /// jeder Neukonfiguration uebernommen.
    pub fn callback_setzen(&mut self, callback: EntryCallback) {
        if let Some(empfaenger) = &self.empfaenger {
            empfaenger.callback_setzen(Arc::clone(&callback));
        }
        self.callback = callback;
    }

    /// Uebernimmt eine neue Konfiguration
    ///
    /// Stoppt die alte Empfangs-Schleife (und wartet auf ihr Ende),
    /// ersetzt beide Sockets, bindet den Empfang an den konfigurierten
    /// Port, tritt gegebenenfalls der Multicast-Gruppe bei und startet
    /// eine frische Schleife mit dem registrierten Callback.
    pub async fn konfigurieren(&mut self, config: Configuration) -> ChatResult<()> {
        // Alte Schleife vollstaendig beenden bevor neu gebunden wird
        if let Some(mut empfaenger) = self.empfaenger.take() {
            empfaenger.stoppen().await;
        }

        // Sende-Socket ersetzen
        self.sende_socket = Some(Self::sende_socket_oeffnen(&config).await?);

        // Empfangs-Socket auf dem konfigurierten Port binden. Im
        // Multicast-Modus auf allen Schnittstellen (die Schnittstelle
        // waehlt der Gruppen-Beitritt), sonst direkt auf der
        // konfigurierten Schnittstellen-Adresse falls vorhanden.
        let bind_ip = if config.ist_multicast() {
            Ipv4Addr::UNSPECIFIED
        } else {
            config.schnittstelle().unwrap_or(Ipv4Addr::UNSPECIFIED)
        };
        let bind_addr = SocketAddr::new(IpAddr::V4(bind_ip), config.port());
        let empfangs_socket = UdpSocket::bind(bind_addr).await?;

        if config.ist_multicast() {
            if let IpAddr::V4(gruppe) = config.adresse() {
                let schnittstelle = config.schnittstelle().unwrap_or(Ipv4Addr::UNSPECIFIED);
                empfangs_socket.join_multicast_v4(gruppe, schnittstelle)?;
                tracing::debug!(gruppe = %gruppe, schnittstelle = %schnittstelle, "Multicast-Gruppe beigetreten");
            }
        }

        let mut empfaenger = ChatReceiver::neu(
            Arc::clone(&self.register),
            Arc::new(empfangs_socket),
            Arc::clone(&self.callback),
        );
        empfaenger.starten();
        self.empfaenger = Some(empfaenger);

        tracing::info!(
            adresse = %config.adresse(),
            port = config.port(),
            modus = ?config.modus(),
            "Sitzung konfiguriert"
        );
        self.config = config;
        Ok(())
    }

    /// Sendet eine Nachricht als ein Datagramm an den konfigurierten
    /// Endpunkt
    ///
    /// Oeffnet bei Bedarf einen Sende-Socket (z.B. wenn noch nie
    /// konfiguriert wurde). Senden ist fire-and-forget: ob irgendjemand
    /// das Paket dekodieren konnte, erfaehrt der Absender nicht.
    pub async fn senden(&mut self, kanal: &Arc<Channel>, nachricht: ChatMessage) -> ChatResult<()> {
        let eintrag = ChatEntry::neu(Arc::clone(kanal), nachricht);
        let paket = eintrag.verschluesseln()?;

        if self.sende_socket.is_none() {
            self.sende_socket = Some(Self::sende_socket_oeffnen(&self.config).await?);
        }

        let ziel = SocketAddr::new(self.config.adresse(), self.config.port());
        if let Some(socket) = &self.sende_socket {
            socket.send_to(&paket, ziel).await?;
            tracing::trace!(kanal = %kanal, ziel = %ziel, bytes = paket.len(), "Paket gesendet");
        }
        Ok(())
    }

    /// Sendet einen Text unter dem konfigurierten Benutzernamen
    pub async fn text_senden(&mut self, kanal: &Arc<Channel>, text: &str) -> ChatResult<()> {
        let nachricht = ChatMessage::neu(self.config.benutzername(), text);
        self.senden(kanal, nachricht).await
    }

    /// Beendet die Sitzung
    ///
    /// Schliesst den Sende-Socket, stoppt die Empfangs-Schleife und gibt
    /// den Empfangs-Socket frei. Sicher zu jedem Zeitpunkt, auch vor der
    /// ersten Konfiguration oder doppelt.
    pub async fn beenden(&mut self) {
        self.sende_socket = None;
        if let Some(mut empfaenger) = self.empfaenger.take() {
            empfaenger.stoppen().await;
        }
        tracing::info!("Sitzung beendet");
    }

    /// Oeffnet einen Sende-Socket auf einem ephemeren Port
    async fn sende_socket_oeffnen(config: &Configuration) -> ChatResult<UdpSocket> {
        let socket = UdpSocket::bind(SocketAddr::new(
            IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            0,
        ))
        .await?;
        if config.ist_broadcast() {
            socket.set_broadcast(true)?;
        }
        Ok(socket)
    }
}

impl Default for ChatClient {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn beenden_vor_konfigurieren_ist_harmlos() {
        let mut client = ChatClient::neu();
        // Kein Socket, kein Empfaenger: darf nicht fehlschlagen
        client.beenden().await;
        client.beenden().await;
        assert!(!client.empfaengt());
    }

    #[tokio::test]
    async fn senden_oeffnet_socket_bei_bedarf() {
        let mut client = ChatClient::neu();
        let mut config = Configuration::default();
        // Loopback-Ziel, damit der Test keine Netzwerk-Infrastruktur braucht
        config.adresse_setzen(IpAddr::V4(Ipv4Addr::LOCALHOST));
        config.port_setzen(50999);
        client.config = config;

        let kanal = client.register().kanal_aus_name("general").unwrap().unwrap();
        client.text_senden(&kanal, "hallo").await.unwrap();
        assert!(client.sende_socket.is_some());
    }

    #[tokio::test]
    async fn konfigurieren_startet_empfaenger() {
        let mut client = ChatClient::neu();
        let mut config = Configuration::default();
        config.adresse_setzen(IpAddr::V4(Ipv4Addr::LOCALHOST));
        // Ephemeren Port verwenden um Kollisionen zwischen Tests zu vermeiden
        config.port_setzen(u32::from(freier_port().await));
        client.konfigurieren(config).await.unwrap();

        // Kurz warten bis der Task laeuft
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(client.empfaengt());

        client.beenden().await;
        assert!(!client.empfaengt());
    }

    #[tokio::test]
    async fn neukonfiguration_ersetzt_die_schleife() {
        let mut client = ChatClient::neu();

        let mut config = Configuration::default();
        config.adresse_setzen(IpAddr::V4(Ipv4Addr::LOCALHOST));
        config.port_setzen(u32::from(freier_port().await));
        client.konfigurieren(config.clone()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(client.empfaengt());

        // Zweite Konfiguration auf einem anderen Port
        config.port_setzen(u32::from(freier_port().await));
        client.konfigurieren(config).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(client.empfaengt());

        client.beenden().await;
    }

    /// Reserviert kurz einen freien UDP-Port und gibt ihn wieder frei
    async fn freier_port() -> u16 {
        let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        socket.local_addr().unwrap().port()
    }
}
