use serde::{Deserialize, Serialize};

use super::types::{OutboundMessage, SignalingError};

/// Kind of signaling payload carried by an envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MsgType {
    #[serde(rename = "offer")]
    Offer,

    #[serde(rename = "answer")]
    Answer,

    #[serde(rename = "ice_candidate")]
    IceCandidate,
}

/// Signaling message relayed between peers.
///
/// `value` is opaque (SDP or serialized ICE candidate) and is never inspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "msgtype")]
    pub kind: MsgType,
    pub value: String,
}

impl Envelope {
    pub fn new(kind: MsgType, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn decode(text: &str) -> Result<Self, SignalingError> {
        serde_json::from_str(text).map_err(SignalingError::Decode)
    }

    pub fn decode_slice(bytes: &[u8]) -> Result<Self, SignalingError> {
        serde_json::from_slice(bytes).map_err(SignalingError::Decode)
    }

    /// Canonical wire form: `{"msgtype":"...","value":"..."}`
    pub fn encode(&self) -> Result<OutboundMessage, SignalingError> {
        serde_json::to_string(self)
            .map(OutboundMessage::from)
            .map_err(SignalingError::Encode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_offer() {
        let json = r#"{"msgtype":"offer","value":"abc"}"#;
        let msg = Envelope::decode(json).unwrap();
        assert_eq!(msg.kind, MsgType::Offer);
        assert_eq!(msg.value, "abc");
    }

    #[test]
    fn parse_answer_and_ice_candidate() {
        let answer = Envelope::decode(r#"{"msgtype": "answer", "value": "v=0"}"#).unwrap();
        assert_eq!(answer.kind, MsgType::Answer);

        let candidate =
            Envelope::decode(r#"{"msgtype": "ice_candidate", "value": "{\"candidate\":\"\"}"}"#)
                .unwrap();
        assert_eq!(candidate.kind, MsgType::IceCandidate);
        assert_eq!(candidate.value, r#"{"candidate":""}"#);
    }

    #[test]
    fn offer_round_trips_to_identical_bytes() {
        let json = r#"{"msgtype":"offer","value":"abc"}"#;
        let encoded = Envelope::decode(json).unwrap().encode().unwrap();
        assert_eq!(encoded.as_str(), json);
    }

    #[test]
    fn reencode_normalizes_whitespace_and_drops_unknown_fields() {
        let json = r#"{ "value" : "x", "extra": 1, "msgtype" : "answer" }"#;
        let encoded = Envelope::decode(json).unwrap().encode().unwrap();
        assert_eq!(encoded.as_str(), r#"{"msgtype":"answer","value":"x"}"#);
    }

    #[test]
    fn reject_unknown_msgtype() {
        let json = r#"{"msgtype":"bogus","value":"x"}"#;
        assert!(matches!(
            Envelope::decode(json),
            Err(SignalingError::Decode(_))
        ));
    }

    #[test]
    fn reject_missing_fields() {
        assert!(Envelope::decode(r#"{"msgtype":"offer"}"#).is_err());
        assert!(Envelope::decode(r#"{"value":"abc"}"#).is_err());
        assert!(Envelope::decode("{}").is_err());
    }

    #[test]
    fn reject_non_string_value() {
        assert!(Envelope::decode(r#"{"msgtype":"offer","value":42}"#).is_err());
    }

    #[test]
    fn reject_invalid_json() {
        assert!(Envelope::decode("not json").is_err());
        assert!(Envelope::decode("").is_err());
        assert!(Envelope::decode(r#"{"msgtype":"offer","value":"abc""#).is_err());
    }

    #[test]
    fn parse_from_bytes() {
        let msg = Envelope::decode_slice(br#"{"msgtype":"ice_candidate","value":"c"}"#).unwrap();
        assert_eq!(msg, Envelope::new(MsgType::IceCandidate, "c"));
        assert!(Envelope::decode_slice(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn serialize_escapes_value() {
        let msg = Envelope::new(MsgType::Offer, "line1\nline2 \"quoted\"");
        let encoded = msg.encode().unwrap();
        assert_eq!(
            encoded.as_str(),
            r#"{"msgtype":"offer","value":"line1\nline2 \"quoted\""}"#
        );
        assert_eq!(Envelope::decode(encoded.as_str()).unwrap(), msg);
    }
}
