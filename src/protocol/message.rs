//! Hub message kinds and their body layouts.
//!
//! | Kind             | Tag | Body fields (in order)                                   |
//! |------------------|-----|----------------------------------------------------------|
//! | Invocation       | 1   | invocationId: string?, target: string, arguments: payload[] |
//! | StreamItem       | 2   | invocationId: string, item: payload                      |
//! | Completion       | 3   | invocationId: string, error: string?, hasResult: bool, result: payload? |
//! | StreamInvocation | 4   | invocationId: string, target: string, arguments: payload[] |
//! | CancelInvocation | 5   | invocationId: string                                     |
//! | Ping             | 6   | (none)                                                   |
//! | Close            | 7   | error: string?, allowReconnect: bool                     |

use crate::core::serialization::{Payload, PayloadSerializer};
use crate::core::wire::{put_bool, put_payload, put_payloads, put_string, BodyReader};
use crate::error::{ProtocolError, Result};
use crate::protocol::binder::InvocationBinder;
use bytes::BufMut;
use tracing::trace;

/// Wire tag of each message kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum MessageType {
    Invocation = 1,
    StreamItem = 2,
    Completion = 3,
    StreamInvocation = 4,
    CancelInvocation = 5,
    Ping = 6,
    Close = 7,
}

impl MessageType {
    pub fn tag(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            MessageType::Invocation => "Invocation",
            MessageType::StreamItem => "StreamItem",
            MessageType::Completion => "Completion",
            MessageType::StreamInvocation => "StreamInvocation",
            MessageType::CancelInvocation => "CancelInvocation",
            MessageType::Ping => "Ping",
            MessageType::Close => "Close",
        }
    }
}

impl TryFrom<i32> for MessageType {
    type Error = ProtocolError;

    fn try_from(tag: i32) -> Result<Self> {
        match tag {
            1 => Ok(MessageType::Invocation),
            2 => Ok(MessageType::StreamItem),
            3 => Ok(MessageType::Completion),
            4 => Ok(MessageType::StreamInvocation),
            5 => Ok(MessageType::CancelInvocation),
            6 => Ok(MessageType::Ping),
            7 => Ok(MessageType::Close),
            other => Err(ProtocolError::UnknownMessageType(other)),
        }
    }
}

/// How an invocation finished
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionOutcome {
    /// The invocation failed with this message
    Error(String),
    /// The invocation produced a value
    Result(Payload),
    /// The invocation finished without a value
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HubMessage {
    Invocation {
        /// `None` for fire-and-forget calls
        invocation_id: Option<String>,
        target: String,
        arguments: Vec<Payload>,
    },
    StreamItem {
        invocation_id: String,
        item: Payload,
    },
    Completion {
        invocation_id: String,
        outcome: CompletionOutcome,
    },
    StreamInvocation {
        invocation_id: String,
        target: String,
        arguments: Vec<Payload>,
    },
    CancelInvocation {
        invocation_id: String,
    },
    Ping,
    Close {
        error: Option<String>,
        allow_reconnect: bool,
    },
}

impl HubMessage {
    pub fn completion_with_error(
        invocation_id: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        HubMessage::Completion {
            invocation_id: invocation_id.into(),
            outcome: CompletionOutcome::Error(error.into()),
        }
    }

    pub fn completion_with_result(invocation_id: impl Into<String>, result: Payload) -> Self {
        HubMessage::Completion {
            invocation_id: invocation_id.into(),
            outcome: CompletionOutcome::Result(result),
        }
    }

    pub fn empty_completion(invocation_id: impl Into<String>) -> Self {
        HubMessage::Completion {
            invocation_id: invocation_id.into(),
            outcome: CompletionOutcome::Empty,
        }
    }

    pub fn message_type(&self) -> MessageType {
        match self {
            HubMessage::Invocation { .. } => MessageType::Invocation,
            HubMessage::StreamItem { .. } => MessageType::StreamItem,
            HubMessage::Completion { .. } => MessageType::Completion,
            HubMessage::StreamInvocation { .. } => MessageType::StreamInvocation,
            HubMessage::CancelInvocation { .. } => MessageType::CancelInvocation,
            HubMessage::Ping => MessageType::Ping,
            HubMessage::Close { .. } => MessageType::Close,
        }
    }

    /// Write the body fields (everything after the tag).
    pub fn write_body<B: BufMut>(
        &self,
        dst: &mut B,
        serializer: &dyn PayloadSerializer,
    ) -> Result<()> {
        match self {
            HubMessage::Invocation {
                invocation_id,
                target,
                arguments,
            } => {
                put_string(dst, invocation_id.as_deref());
                put_string(dst, Some(target));
                put_payloads(dst, serializer, arguments)?;
            }
            HubMessage::StreamItem {
                invocation_id,
                item,
            } => {
                put_string(dst, Some(invocation_id));
                put_payload(dst, serializer, item)?;
            }
            HubMessage::Completion {
                invocation_id,
                outcome,
            } => {
                put_string(dst, Some(invocation_id));
                match outcome {
                    CompletionOutcome::Error(error) => {
                        put_string(dst, Some(error));
                        // The flag is always present, even next to an error
                        put_bool(dst, false);
                    }
                    CompletionOutcome::Result(result) => {
                        put_string(dst, None);
                        put_bool(dst, true);
                        put_payload(dst, serializer, result)?;
                    }
                    CompletionOutcome::Empty => {
                        put_string(dst, None);
                        put_bool(dst, false);
                    }
                }
            }
            HubMessage::StreamInvocation {
                invocation_id,
                target,
                arguments,
            } => {
                put_string(dst, Some(invocation_id));
                put_string(dst, Some(target));
                put_payloads(dst, serializer, arguments)?;
            }
            HubMessage::CancelInvocation { invocation_id } => {
                put_string(dst, Some(invocation_id));
            }
            HubMessage::Ping => {}
            HubMessage::Close {
                error,
                allow_reconnect,
            } => {
                put_string(dst, error.as_deref());
                put_bool(dst, *allow_reconnect);
            }
        }
        Ok(())
    }

    /// Parse one body of the given kind. `body` is exactly the bytes that
    /// follow the tag inside the frame.
    pub fn parse_body(
        message_type: MessageType,
        body: &[u8],
        binder: &dyn InvocationBinder,
        serializer: &dyn PayloadSerializer,
    ) -> Result<Self> {
        let mut reader = BodyReader::new(body);

        let message = match message_type {
            MessageType::Invocation => {
                let invocation_id = reader.read_string()?;
                let target = reader.read_required_string("target")?;
                let arguments = read_arguments(&mut reader, &target, binder, serializer)?;
                HubMessage::Invocation {
                    invocation_id,
                    target,
                    arguments,
                }
            }
            MessageType::StreamItem => {
                let invocation_id = reader.read_required_string("invocationId")?;
                let item_type = binder.return_type(&invocation_id)?;
                let item = reader.read_payload(serializer, item_type)?;
                HubMessage::StreamItem {
                    invocation_id,
                    item,
                }
            }
            MessageType::Completion => {
                let invocation_id = reader.read_required_string("invocationId")?;
                let error = reader.read_string()?;
                let has_result = reader.read_bool()?;
                let outcome = match error {
                    // hasResult is ignored once an error is present
                    Some(error) => CompletionOutcome::Error(error),
                    None if has_result => {
                        let result_type = binder.return_type(&invocation_id)?;
                        CompletionOutcome::Result(reader.read_payload(serializer, result_type)?)
                    }
                    None => CompletionOutcome::Empty,
                };
                HubMessage::Completion {
                    invocation_id,
                    outcome,
                }
            }
            MessageType::StreamInvocation => {
                let invocation_id = reader.read_required_string("invocationId")?;
                let target = reader.read_required_string("target")?;
                let arguments = read_arguments(&mut reader, &target, binder, serializer)?;
                HubMessage::StreamInvocation {
                    invocation_id,
                    target,
                    arguments,
                }
            }
            MessageType::CancelInvocation => HubMessage::CancelInvocation {
                invocation_id: reader.read_required_string("invocationId")?,
            },
            MessageType::Ping => HubMessage::Ping,
            MessageType::Close => {
                let error = reader.read_string()?;
                let allow_reconnect = reader.read_bool()?;
                HubMessage::Close {
                    error,
                    allow_reconnect,
                }
            }
        };

        if reader.remaining() > 0 {
            trace!(
                message_type = message_type.name(),
                trailing = reader.remaining(),
                "Ignoring trailing body bytes"
            );
        }

        Ok(message)
    }
}

fn read_arguments(
    reader: &mut BodyReader<'_>,
    target: &str,
    binder: &dyn InvocationBinder,
    serializer: &dyn PayloadSerializer,
) -> Result<Vec<Payload>> {
    let types = binder.parameter_types(target)?;
    reader.read_payloads(serializer, &types, |actual| {
        ProtocolError::ArgumentCountMismatch {
            target: target.to_string(),
            expected: types.len(),
            actual,
        }
    })
}
