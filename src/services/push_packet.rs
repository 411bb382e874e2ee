//! Text frames of the push channel (Socket.IO v5 carried by Engine.IO v4).
//!
//! An Engine.IO frame is a single type digit followed by its payload. Message
//! frames (`4`) wrap a Socket.IO packet: a type digit, an optional
//! `/namespace,` prefix, an optional numeric ack id, then a JSON body.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum PacketError {
    #[error("empty frame")]
    Empty,

    #[error("unknown packet type {0:?}")]
    UnknownType(char),

    #[error("binary packets are not supported")]
    Binary,

    #[error("invalid packet body: {0}")]
    Body(String),
}

/// Handshake sent by the server in the `open` packet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Message(SocketPacket),
    Upgrade,
    Noop,
}

impl EnginePacket {
    pub fn decode(frame: &str) -> Result<Self, PacketError> {
        let mut chars = frame.chars();
        let kind = chars.next().ok_or(PacketError::Empty)?;
        let payload = chars.as_str();
        match kind {
            '0' => serde_json::from_str(payload)
                .map(EnginePacket::Open)
                .map_err(|e| PacketError::Body(e.to_string())),
            '1' => Ok(EnginePacket::Close),
            '2' => Ok(EnginePacket::Ping(payload.to_string())),
            '3' => Ok(EnginePacket::Pong(payload.to_string())),
            '4' => SocketPacket::decode(payload).map(EnginePacket::Message),
            '5' => Ok(EnginePacket::Upgrade),
            '6' => Ok(EnginePacket::Noop),
            other => Err(PacketError::UnknownType(other)),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            EnginePacket::Open(handshake) => format!(
                "0{}",
                serde_json::json!({
                    "sid": handshake.sid,
                    "pingInterval": handshake.ping_interval,
                    "pingTimeout": handshake.ping_timeout,
                })
            ),
            EnginePacket::Close => "1".into(),
            EnginePacket::Ping(payload) => format!("2{payload}"),
            EnginePacket::Pong(payload) => format!("3{payload}"),
            EnginePacket::Message(packet) => format!("4{}", packet.encode()),
            EnginePacket::Upgrade => "5".into(),
            EnginePacket::Noop => "6".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketPacketKind {
    Connect,
    Disconnect,
    Event,
    Ack,
    ConnectError,
}

impl SocketPacketKind {
    fn from_digit(digit: char) -> Result<Self, PacketError> {
        match digit {
            '0' => Ok(SocketPacketKind::Connect),
            '1' => Ok(SocketPacketKind::Disconnect),
            '2' => Ok(SocketPacketKind::Event),
            '3' => Ok(SocketPacketKind::Ack),
            '4' => Ok(SocketPacketKind::ConnectError),
            '5' | '6' => Err(PacketError::Binary),
            other => Err(PacketError::UnknownType(other)),
        }
    }

    fn digit(self) -> char {
        match self {
            SocketPacketKind::Connect => '0',
            SocketPacketKind::Disconnect => '1',
            SocketPacketKind::Event => '2',
            SocketPacketKind::Ack => '3',
            SocketPacketKind::ConnectError => '4',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SocketPacket {
    pub kind: SocketPacketKind,
    pub namespace: String,
    pub ack_id: Option<u64>,
    pub data: Option<Value>,
}

impl SocketPacket {
    /// `CONNECT` to the default namespace.
    pub fn connect() -> Self {
        SocketPacket {
            kind: SocketPacketKind::Connect,
            namespace: "/".into(),
            ack_id: None,
            data: None,
        }
    }

    pub fn decode(payload: &str) -> Result<Self, PacketError> {
        let mut chars = payload.chars();
        let kind = SocketPacketKind::from_digit(chars.next().ok_or(PacketError::Empty)?)?;
        let mut rest = chars.as_str();

        let mut namespace = "/".to_string();
        if rest.starts_with('/') {
            let (ns, tail) = rest.split_once(',').unwrap_or((rest, ""));
            namespace = ns.to_string();
            rest = tail;
        }

        let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        let ack_id = if digits > 0 {
            let id = rest[..digits]
                .parse::<u64>()
                .map_err(|e| PacketError::Body(e.to_string()))?;
            rest = &rest[digits..];
            Some(id)
        } else {
            None
        };

        let data = if rest.is_empty() {
            None
        } else {
            Some(serde_json::from_str(rest).map_err(|e| PacketError::Body(e.to_string()))?)
        };

        Ok(SocketPacket {
            kind,
            namespace,
            ack_id,
            data,
        })
    }

    pub fn encode(&self) -> String {
        let mut out = String::new();
        out.push(self.kind.digit());
        if self.namespace != "/" {
            out.push_str(&self.namespace);
            out.push(',');
        }
        if let Some(id) = self.ack_id {
            out.push_str(&id.to_string());
        }
        if let Some(data) = &self.data {
            out.push_str(&data.to_string());
        }
        out
    }

    /// Event name and first argument of an `EVENT` packet.
    pub fn event(&self) -> Option<(&str, Option<&Value>)> {
        if self.kind != SocketPacketKind::Event {
            return None;
        }
        let args = self.data.as_ref()?.as_array()?;
        let name = args.first()?.as_str()?;
        Some((name, args.get(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_open_handshake() {
        let packet =
            EnginePacket::decode(r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000}"#)
                .unwrap();
        assert_eq!(
            packet,
            EnginePacket::Open(Handshake {
                sid: "abc".into(),
                ping_interval: 25000,
                ping_timeout: 20000,
            })
        );
    }

    #[test]
    fn connect_request_is_40() {
        assert_eq!(EnginePacket::Message(SocketPacket::connect()).encode(), "40");
    }

    #[test]
    fn ping_is_answered_with_matching_pong() {
        let EnginePacket::Ping(payload) = EnginePacket::decode("2probe").unwrap() else {
            panic!("expected ping");
        };
        assert_eq!(EnginePacket::Pong(payload).encode(), "3probe");
    }

    #[test]
    fn decodes_event_with_payload() {
        let frame = r#"42["dataSaved",{"user":{"login":"octocat"}}]"#;
        let EnginePacket::Message(packet) = EnginePacket::decode(frame).unwrap() else {
            panic!("expected message");
        };

        let (name, arg) = packet.event().unwrap();
        assert_eq!(name, "dataSaved");
        assert_eq!(arg, Some(&json!({"user": {"login": "octocat"}})));
        assert_eq!(packet.namespace, "/");
        assert_eq!(packet.ack_id, None);
    }

    #[test]
    fn decodes_namespace_and_ack_id() {
        let packet = SocketPacket::decode(r#"2/admin,13["ping"]"#).unwrap();
        assert_eq!(packet.namespace, "/admin");
        assert_eq!(packet.ack_id, Some(13));
        assert_eq!(packet.event().map(|(name, _)| name), Some("ping"));
        assert_eq!(packet.encode(), r#"2/admin,13["ping"]"#);
    }

    #[test]
    fn connect_ack_carries_sid() {
        let packet = SocketPacket::decode(r#"0{"sid":"xyz"}"#).unwrap();
        assert_eq!(packet.kind, SocketPacketKind::Connect);
        assert!(packet.event().is_none());
    }

    #[test]
    fn rejects_bad_frames() {
        assert_eq!(EnginePacket::decode(""), Err(PacketError::Empty));
        assert_eq!(EnginePacket::decode("9"), Err(PacketError::UnknownType('9')));
        assert_eq!(EnginePacket::decode("45-[\"x\"]"), Err(PacketError::Binary));
        assert!(matches!(EnginePacket::decode("42[oops"), Err(PacketError::Body(_))));
    }
}
