//! Gemeinsame Typen fuer Flurfunk
//!
//! Enthaelt den 28-Byte-Kanal-Hash (Newtype mit Wert-Gleichheit, damit
//! Byte-Inhalte und nicht Referenzen verglichen werden) sowie die
//! Konfiguration einer Chat-Sitzung.

use std::net::{IpAddr, Ipv4Addr};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Standard-UDP-Port fuer Flurfunk
pub const DEFAULT_PORT: u16 = 64247;

/// Standard-Multicast-Gruppe (willkuerlich gewaehlte IPv4-Multicast-Adresse)
///
/// Historisch kursierten zwei Gruppen (225.255.8.0 und 225.225.8.0);
/// 225.255.8.0 ist die kanonische.
pub const DEFAULT_MULTICAST_GRUPPE: Ipv4Addr = Ipv4Addr::new(225, 255, 8, 0);

/// IPv4 Limited-Broadcast-Adresse
pub const BROADCAST_ADRESSE: Ipv4Addr = Ipv4Addr::BROADCAST;

/// "Any"-Adresse (INADDR_ANY), lauscht auf allen Schnittstellen
pub const LAUSCH_ADRESSE: Ipv4Addr = Ipv4Addr::UNSPECIFIED;

/// Maximale Laenge des Benutzernamens in Zeichen
pub const MAX_BENUTZERNAME_LAENGE: usize = 18;

// ---------------------------------------------------------------------------
// ChannelHash
// ---------------------------------------------------------------------------

/// 28-Byte-Kanal-Kennung, abgeleitet aus dem Kanalnamen
///
/// Dient auf dem Draht als einziger Demultiplex-Schluessel: ein Empfaenger
/// erkennt "seine" Kanaele am Hash, ohne den Klartext-Namen zu sehen.
/// Vergleich und HashMap-Schluessel arbeiten auf dem Byte-Inhalt.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelHash([u8; Self::LAENGE]);

impl ChannelHash {
    /// Laenge des Kanal-Hashes in Bytes (SHA-224-Digest)
    pub const LAENGE: usize = 28;

    /// Erstellt einen ChannelHash aus exakt 28 Bytes
    ///
    /// Gibt `None` zurueck wenn das Slice die falsche Laenge hat.
    pub fn aus_bytes(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; Self::LAENGE] = bytes.try_into().ok()?;
        Some(Self(arr))
    }

    /// Gibt die rohen Hash-Bytes zurueck
    pub fn as_bytes(&self) -> &[u8; Self::LAENGE] {
        &self.0
    }
}

impl From<[u8; ChannelHash::LAENGE]> for ChannelHash {
    fn from(bytes: [u8; ChannelHash::LAENGE]) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Display for ChannelHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", BASE64.encode(self.0))
    }
}

impl std::fmt::Debug for ChannelHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ChannelHash({})", self)
    }
}

// ---------------------------------------------------------------------------
// Kommunikationsmodus
// ---------------------------------------------------------------------------

/// Art der Aussendung von Chat-Paketen
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunicationType {
    /// Multicast an eine Gruppen-Adresse (Standard)
    #[default]
    Multicast,
    /// IPv4 Limited-Broadcast (255.255.255.255)
    Broadcast,
    /// Direkt an eine einzelne Gegenstelle
    Direct,
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Konfiguration einer Chat-Sitzung
///
/// Wird von der (hier nicht enthaltenen) Oberflaeche befuellt und als Wert
/// an `ChatClient::konfigurieren` uebergeben. Alle Felder haben sinnvolle
/// Standardwerte, sodass die Sitzung auch ohne Konfigurationsdatei laeuft.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Anzeigename des Benutzers (getrimmt, maximal 18 Zeichen)
    benutzername: String,
    /// Ziel-Adresse (Multicast-Gruppe, Broadcast- oder Peer-Adresse)
    adresse: IpAddr,
    /// UDP-Port (1 bis 65535)
    port: u16,
    /// Kommunikationsmodus, wird aus der Adresse abgeleitet
    modus: CommunicationType,
    /// Optionale Schnittstellen-Adresse fuer den Multicast-Join
    schnittstelle: Option<Ipv4Addr>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            benutzername: standard_benutzername(),
            adresse: IpAddr::V4(DEFAULT_MULTICAST_GRUPPE),
            port: DEFAULT_PORT,
            modus: CommunicationType::Multicast,
            schnittstelle: None,
        }
    }
}

/// Ermittelt den Standard-Benutzernamen aus der Umgebung
///
/// Fallback: "flurfunk" wenn weder `USER` noch `USERNAME` gesetzt ist.
pub fn standard_benutzername() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "flurfunk".to_string())
}

impl Configuration {
    /// Erstellt eine Konfiguration mit Standardwerten
    pub fn neu() -> Self {
        Self::default()
    }

    pub fn benutzername(&self) -> &str {
        &self.benutzername
    }

    /// Setzt den Benutzernamen: getrimmt und auf 18 Zeichen gekuerzt
    pub fn benutzername_setzen(&mut self, name: &str) {
        let name = name.trim();
        self.benutzername = name.chars().take(MAX_BENUTZERNAME_LAENGE).collect();
    }

    pub fn adresse(&self) -> IpAddr {
        self.adresse
    }

    /// Setzt die Ziel-Adresse und leitet den Kommunikationsmodus ab
    ///
    /// Die Limited-Broadcast-Adresse schaltet in den Broadcast-Modus, eine
    /// Multicast-Adresse in den Multicast-Modus, alles andere gilt als
    /// direkte Gegenstelle.
    pub fn adresse_setzen(&mut self, adresse: IpAddr) {
        self.modus = match adresse {
            IpAddr::V4(v4) if v4 == BROADCAST_ADRESSE => CommunicationType::Broadcast,
            a if a.is_multicast() => CommunicationType::Multicast,
            _ => CommunicationType::Direct,
        };
        self.adresse = adresse;
    }

    /// Schaltet in den Broadcast-Modus (setzt die Broadcast-Adresse)
    pub fn broadcast_setzen(&mut self) {
        self.modus = CommunicationType::Broadcast;
        self.adresse = IpAddr::V4(BROADCAST_ADRESSE);
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Setzt den Port, geklemmt auf den Bereich 1 bis 65535
    ///
    /// Port 0 waere technisch moeglich, ist aber nicht fuer direkte
    /// Kommunikation gedacht.
    pub fn port_setzen(&mut self, port: u32) {
        self.port = port.clamp(1, u16::MAX as u32) as u16;
    }

    pub fn modus(&self) -> CommunicationType {
        self.modus
    }

    pub fn ist_multicast(&self) -> bool {
        self.modus == CommunicationType::Multicast
    }

    pub fn ist_broadcast(&self) -> bool {
        self.modus == CommunicationType::Broadcast
    }

    pub fn ist_direkt(&self) -> bool {
        self.modus == CommunicationType::Direct
    }

    pub fn schnittstelle(&self) -> Option<Ipv4Addr> {
        self.schnittstelle
    }

    /// Bindet den Empfang an eine bestimmte Schnittstellen-Adresse
    pub fn schnittstelle_setzen(&mut self, schnittstelle: Option<Ipv4Addr>) {
        self.schnittstelle = schnittstelle;
    }

    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }
}

impl std::fmt::Display for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ benutzername = {}; adresse = {}; port = {}; modus = {:?} }}",
            self.benutzername, self.adresse, self.port, self.modus
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_hash_laenge_erzwungen() {
        assert!(ChannelHash::aus_bytes(&[0u8; 28]).is_some());
        assert!(ChannelHash::aus_bytes(&[0u8; 27]).is_none());
        assert!(ChannelHash::aus_bytes(&[0u8; 29]).is_none());
        assert!(ChannelHash::aus_bytes(&[]).is_none());
    }

    #[test]
    fn channel_hash_wert_gleichheit() {
        let a = ChannelHash::aus_bytes(&[7u8; 28]).unwrap();
        let b = ChannelHash::aus_bytes(&[7u8; 28]).unwrap();
        let c = ChannelHash::aus_bytes(&[8u8; 28]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn standard_config_ist_valide() {
        let cfg = Configuration::default();
        assert_eq!(cfg.port(), 64247);
        assert_eq!(cfg.adresse(), IpAddr::V4(Ipv4Addr::new(225, 255, 8, 0)));
        assert!(cfg.ist_multicast());
        assert!(cfg.schnittstelle().is_none());
    }

    #[test]
    fn benutzername_wird_getrimmt_und_gekuerzt() {
        let mut cfg = Configuration::neu();
        cfg.benutzername_setzen("  alice  ");
        assert_eq!(cfg.benutzername(), "alice");

        cfg.benutzername_setzen("ein-viel-zu-langer-benutzername");
        assert_eq!(cfg.benutzername().chars().count(), 18);
        assert_eq!(cfg.benutzername(), "ein-viel-zu-langer");
    }

    #[test]
    fn adresse_bestimmt_modus() {
        let mut cfg = Configuration::neu();

        cfg.adresse_setzen(IpAddr::V4(Ipv4Addr::new(255, 255, 255, 255)));
        assert!(cfg.ist_broadcast());

        cfg.adresse_setzen(IpAddr::V4(Ipv4Addr::new(225, 225, 8, 0)));
        assert!(cfg.ist_multicast());

        cfg.adresse_setzen(IpAddr::V4(Ipv4Addr::new(192, 168, 0, 17)));
        assert!(cfg.ist_direkt());
    }

    #[test]
    fn port_wird_geklemmt() {
        let mut cfg = Configuration::neu();
        cfg.port_setzen(0);
        assert_eq!(cfg.port(), 1);
        cfg.port_setzen(70000);
        assert_eq!(cfg.port(), 65535);
        cfg.port_setzen(64247);
        assert_eq!(cfg.port(), 64247);
    }

    #[test]
    fn config_aus_toml_string() {
        let toml = r#"
            benutzername = "bob"
            port = 50000
        "#;
        let cfg: Configuration = toml::from_str(toml).unwrap();
        assert_eq!(cfg.benutzername(), "bob");
        assert_eq!(cfg.port(), 50000);
        // Nicht angegebene Felder behalten Standardwerte
        assert!(cfg.ist_multicast());
        assert_eq!(cfg.adresse(), IpAddr::V4(DEFAULT_MULTICAST_GRUPPE));
    }

    #[test]
    fn config_serde_round_trip() {
        let mut cfg = Configuration::neu();
        cfg.benutzername_setzen("carol");
        cfg.broadcast_setzen();
        let text = toml::to_string(&cfg).unwrap();
        let wieder: Configuration = toml::from_str(&text).unwrap();
        assert_eq!(wieder.benutzername(), "carol");
        assert!(wieder.ist_broadcast());
    }

    #[test]
    fn config_ist_json_kompatibel() {
        let mut cfg = Configuration::neu();
        cfg.adresse_setzen(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)));
        let json = serde_json::to_string(&cfg).unwrap();
        let wieder: Configuration = serde_json::from_str(&json).unwrap();
        assert_eq!(wieder.adresse(), cfg.adresse());
        assert!(wieder.ist_direkt());
    }
}
