//! Messages exchanged with the inspector host and their framing.
//!
//! Every message is one JSON document behind a 4-byte big-endian length
//! prefix. [`JsonFraming`] owns the size limit and [`JsonPort`] moves framed
//! messages between two in-process ends.

use ds_analyzer::AnnotatedNode;
use ds_analyzer::RankOrder;
use ds_core::DomspyError;
use ds_core::DomspyResult;
use ds_highlight::SelectionEvent;
use ds_normalize::CanonicalNode;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::mpsc;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 1024 * 1024;
pub const HARD_MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;
const PREFIX_LEN: usize = 4;

/// Actions an inspector session answers, as they appear on the wire.
pub const REQUEST_ACTIONS: [&str; 4] = [
    "getDOMTree",
    "startHighlighting",
    "stopHighlighting",
    "analyzeDom",
];

/// Requests the host sends to an inspector session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum InboundRequest {
    #[serde(rename = "getDOMTree", alias = "getDomTree")]
    GetDomTree,
    StartHighlighting,
    StopHighlighting,
    AnalyzeDom {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        order: Option<RankOrder>,
    },
}

/// Reply to every [`InboundRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree_data: Option<CanonicalNode>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            tree_data: None,
        }
    }

    pub fn with_tree(tree: CanonicalNode) -> Self {
        Self {
            tree_data: Some(tree),
            ..Self::ok()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            tree_data: None,
        }
    }
}

/// Unsolicited messages pushed to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum OutboundMessage {
    DomAnalysisResult { data: AnnotatedNode },
    ElementSelected { element: SelectionEvent },
}

impl OutboundMessage {
    pub fn action(&self) -> &'static str {
        match self {
            Self::DomAnalysisResult { .. } => "domAnalysisResult",
            Self::ElementSelected { .. } => "elementSelected",
        }
    }
}

/// Fire-and-forget sink for outbound messages.
pub trait Transport {
    fn send(&self, message: &OutboundMessage) -> DomspyResult<()>;
}

/// Length-prefixed JSON codec with a per-message size limit.
///
/// The limit counts JSON bytes only, not the prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonFraming {
    limit: usize,
}

impl Default for JsonFraming {
    fn default() -> Self {
        Self {
            limit: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }
}

impl JsonFraming {
    pub fn with_limit(limit: usize) -> DomspyResult<Self> {
        if !(1..=HARD_MAX_MESSAGE_BYTES).contains(&limit) {
            return Err(DomspyError::new(
                "ipc.frame_limit_invalid",
                format!(
                    "message limit must be between 1 and {HARD_MAX_MESSAGE_BYTES} bytes, got {limit}"
                ),
            ));
        }
        Ok(Self { limit })
    }

    pub fn limit(self) -> usize {
        self.limit
    }

    /// Serializes `message` straight into a frame.
    pub fn write<T: Serialize>(self, message: &T) -> DomspyResult<Vec<u8>> {
        let mut frame = vec![0_u8; PREFIX_LEN];
        serde_json::to_writer(&mut frame, message).map_err(|error| {
            DomspyError::new(
                "ipc.message_encode_failed",
                format!("failed to encode message: {error}"),
            )
        })?;

        let body_len = frame.len() - PREFIX_LEN;
        let declared = u32::try_from(body_len)
            .ok()
            .filter(|_| body_len <= self.limit)
            .ok_or_else(|| self.too_large(body_len))?;
        frame[..PREFIX_LEN].copy_from_slice(&declared.to_be_bytes());
        Ok(frame)
    }

    /// Checks the prefix against the body and deserializes the body.
    pub fn read<T: DeserializeOwned>(self, frame: &[u8]) -> DomspyResult<T> {
        let Some((prefix, body)) = frame.split_first_chunk::<PREFIX_LEN>() else {
            return Err(DomspyError::new(
                "ipc.frame_truncated",
                format!("frame of {} bytes has no length prefix", frame.len()),
            ));
        };

        let declared = u32::from_be_bytes(*prefix) as usize;
        if declared > self.limit {
            return Err(self.too_large(declared));
        }
        if declared != body.len() {
            return Err(DomspyError::new(
                "ipc.frame_length_mismatch",
                format!("prefix declares {declared} bytes but {} follow", body.len()),
            ));
        }

        from_json(body)
    }

    fn too_large(self, len: usize) -> DomspyError {
        DomspyError::new(
            "ipc.message_too_large",
            format!("message of {len} bytes exceeds the {} byte limit", self.limit),
        )
    }
}

/// One end of an in-process JSON channel.
pub struct JsonPort {
    framing: JsonFraming,
    outgoing: mpsc::Sender<Vec<u8>>,
    incoming: mpsc::Receiver<Vec<u8>>,
}

impl JsonPort {
    /// Creates two connected ends sharing one framing.
    pub fn pair(framing: JsonFraming) -> (Self, Self) {
        let (left_tx, right_rx) = mpsc::channel();
        let (right_tx, left_rx) = mpsc::channel();
        (
            Self {
                framing,
                outgoing: left_tx,
                incoming: left_rx,
            },
            Self {
                framing,
                outgoing: right_tx,
                incoming: right_rx,
            },
        )
    }

    pub fn post<T: Serialize>(&self, message: &T) -> DomspyResult<()> {
        let frame = self.framing.write(message)?;
        self.outgoing
            .send(frame)
            .map_err(|_| DomspyError::new("ipc.channel_closed", "peer end was dropped"))
    }

    pub fn receive<T: DeserializeOwned>(&self, timeout: Duration) -> DomspyResult<T> {
        let frame = self.incoming.recv_timeout(timeout).map_err(|error| match error {
            RecvTimeoutError::Timeout => DomspyError::new(
                "ipc.receive_timed_out",
                format!("no message within {timeout:?}"),
            ),
            RecvTimeoutError::Disconnected => {
                DomspyError::new("ipc.channel_closed", "peer end was dropped")
            }
        })?;
        self.framing.read(&frame)
    }
}

impl Transport for JsonPort {
    fn send(&self, message: &OutboundMessage) -> DomspyResult<()> {
        self.post(message)
    }
}

/// Reads an inbound request from an unframed JSON payload.
///
/// An unrecognised `action` fails with `ipc.request_unknown_action`.
pub fn decode_request(payload: &[u8]) -> DomspyResult<InboundRequest> {
    let value: serde_json::Value = from_json(payload)?;
    let action = value
        .get("action")
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned)
        .unwrap_or_default();
    serde_json::from_value(value).map_err(|error| {
        if REQUEST_ACTIONS.contains(&action.as_str()) {
            DomspyError::new(
                "ipc.request_invalid",
                format!("malformed `{action}` request: {error}"),
            )
        } else {
            DomspyError::new(
                "ipc.request_unknown_action",
                format!("unknown action `{action}`"),
            )
        }
    })
}

fn from_json<T: DeserializeOwned>(payload: &[u8]) -> DomspyResult<T> {
    serde_json::from_slice(payload).map_err(|error| {
        DomspyError::new(
            "ipc.message_decode_failed",
            format!("failed to decode message: {error}"),
        )
    })
}
