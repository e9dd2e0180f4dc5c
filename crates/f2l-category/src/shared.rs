//! Shared machinery every category is built on.
//!
//! A concrete category owns one [`CategoryCore`] and delegates envelope
//! construction, reply checking, request/reply round trips and method
//! gating to it. Transaction stamping sits one layer up, in
//! [`Transactional`](crate::Transactional).

use std::sync::Arc;

use f2l_protocol::{
    CategoryId, Channel, Envelope, Frame, HasReplyStatus, Message, MessageId, Payload,
    PayloadKind, VersionType,
};

use crate::{CategoryError, Inbound, MethodAvailabilityTable, Transport, VersionState};

/// Validates a reply: nonzero status becomes
/// [`CategoryError::FoundationReply`].
///
/// Every synchronous call site funnels through here.
pub fn check_reply<R: HasReplyStatus>(reply: &R) -> Result<(), CategoryError> {
    let status = reply.reply_status();
    if status.is_ok() {
        return Ok(());
    }
    Err(CategoryError::FoundationReply {
        code: status.code,
        description: status.description.clone().unwrap_or_default(),
    })
}

/// Identity, version state, gating table and transport of one category.
pub struct CategoryCore<T: Transport> {
    id: CategoryId,
    transport: Arc<T>,
    versions: VersionState,
    availability: MethodAvailabilityTable,
}

impl<T: Transport> CategoryCore<T> {
    /// Creates the core.
    ///
    /// # Errors
    /// [`CategoryError::InvalidOperation`] if `availability` gates a method
    /// at or below the oldest supported version.
    pub fn new(
        id: CategoryId,
        transport: Arc<T>,
        versions: VersionState,
        availability: MethodAvailabilityTable,
    ) -> Result<Self, CategoryError> {
        availability.validate(id, versions.oldest())?;
        Ok(Self {
            id,
            transport,
            versions,
            availability,
        })
    }

    /// The category's identity.
    pub fn id(&self) -> CategoryId {
        self.id
    }

    /// The transport the category talks over.
    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// The version state (fixed or negotiable).
    pub fn versions(&self) -> &VersionState {
        &self.versions
    }

    /// The effective version, read fresh on every call.
    pub fn version(&self) -> VersionType {
        self.versions.current()
    }

    /// The method gating table.
    pub fn availability(&self) -> &MethodAvailabilityTable {
        &self.availability
    }

    /// Returns `true` if `method` is ungated or the effective version has
    /// reached its minimum.
    ///
    /// Gated call sites return `None` (or do nothing, for fire-and-forget
    /// operations) when this is `false`. That is the normal outcome of
    /// talking to an older peer, not an error.
    pub fn is_method_supported(&self, method: &str) -> bool {
        self.availability.is_supported(method, self.version())
    }

    fn envelope<M>(&self, payload: Payload<M>) -> Envelope<M> {
        Envelope {
            category: self.id,
            version: self.version(),
            payload,
        }
    }

    /// Wraps `request` in a fresh envelope stamped with the effective version.
    pub fn create_basic_request<R: Message>(&self, request: R) -> Envelope<R> {
        self.envelope(Payload::Request(request))
    }

    /// Wraps `notification` in a fresh envelope stamped with the effective version.
    pub fn create_notification<N: Message>(&self, notification: N) -> Envelope<N> {
        self.envelope(Payload::Notification(notification))
    }

    /// Wraps `reply` in a fresh envelope with status `code`.
    ///
    /// `error_text` is only recorded when `code` is nonzero.
    pub fn create_reply<R: Message + HasReplyStatus>(
        &self,
        mut reply: R,
        code: i32,
        error_text: &str,
    ) -> Envelope<R> {
        let status = reply.reply_status_mut();
        status.code = code;
        status.description = (code != 0).then(|| error_text.to_string());
        self.envelope(Payload::Reply(reply))
    }

    /// See [`check_reply`].
    pub fn check_reply<R: HasReplyStatus>(&self, reply: &R) -> Result<(), CategoryError> {
        check_reply(reply)
    }

    /// Sends `request` on `channel`, waits for its reply, and checks it.
    ///
    /// # Errors
    /// - [`CategoryError::UnhandledReplyType`]: the correlated frame is not a
    ///   `Rep` reply from this category.
    /// - [`CategoryError::FoundationReply`]: the reply's status is nonzero.
    /// - Transport and protocol errors from the round trip.
    pub async fn send_message_and_get_reply<Req, Rep>(
        &self,
        channel: Channel,
        request: Envelope<Req>,
    ) -> Result<Rep, CategoryError>
    where
        Req: Message,
        Rep: Message + HasReplyStatus,
    {
        let frame = request.to_frame(self.transport.codec())?;
        tracing::debug!(
            category = %self.id,
            %channel,
            message_type = Req::MESSAGE_TYPE,
            "sending request"
        );

        let reply = self.transport.send_and_await_reply(channel, frame).await?;
        if reply.kind != PayloadKind::Reply
            || reply.category != self.id
            || !reply.carries::<Rep>()
        {
            return Err(CategoryError::UnhandledReplyType {
                category: self.id,
                kind: reply.kind,
                message_type: reply.message_type,
            });
        }

        let body: Rep = reply.decode_body(self.transport.codec())?;
        check_reply(&body)?;
        Ok(body)
    }

    /// Sends `envelope` on `channel` without waiting for anything.
    pub fn send_message<M: Message>(
        &self,
        channel: Channel,
        envelope: Envelope<M>,
    ) -> Result<(), CategoryError> {
        let frame = envelope.to_frame(self.transport.codec())?;
        tracing::debug!(
            category = %self.id,
            %channel,
            message_type = M::MESSAGE_TYPE,
            "sending {}",
            frame.kind
        );
        self.transport.send(channel, frame)
    }

    /// Sends a reply envelope answering the inbound frame `request_id`.
    pub fn send_reply<M: Message>(
        &self,
        channel: Channel,
        request_id: MessageId,
        envelope: Envelope<M>,
    ) -> Result<(), CategoryError> {
        let mut frame = envelope.to_frame(self.transport.codec())?;
        frame.in_reply_to = Some(request_id);
        tracing::debug!(
            category = %self.id,
            %channel,
            message_type = M::MESSAGE_TYPE,
            in_reply_to = %request_id,
            "sending reply"
        );
        self.transport.send(channel, frame)
    }

    /// Decodes an inbound frame addressed to this category.
    pub fn decode_inbound<M: Message>(&self, frame: &Frame) -> Result<Inbound<M>, CategoryError> {
        let message = frame.decode_body::<M, _>(self.transport.codec())?;
        Ok(Inbound {
            id: frame.id,
            channel: frame.channel,
            version: frame.version,
            kind: frame.kind,
            transaction: frame.transaction.clone(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use f2l_protocol::ReplyStatus;
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct AckReply {
        status: ReplyStatus,
    }
    f2l_protocol::wire_message!(AckReply, status);

    #[test]
    fn test_check_reply_fails_exactly_for_nonzero_codes() {
        for code in [i32::MIN, -1, 0, 1, 7, i32::MAX] {
            let reply = AckReply {
                status: ReplyStatus {
                    code,
                    description: (code != 0).then(|| format!("code {code}")),
                },
            };

            let result = check_reply(&reply);

            assert_eq!(result.is_err(), code != 0, "code {code}");
            if let Err(CategoryError::FoundationReply {
                code: carried,
                description,
            }) = result
            {
                assert_eq!(carried, code);
                assert_eq!(description, format!("code {code}"));
            }
        }
    }

    #[test]
    fn test_check_reply_without_description_reports_empty_text() {
        let reply = AckReply {
            status: ReplyStatus {
                code: 3,
                description: None,
            },
        };

        assert!(matches!(
            check_reply(&reply),
            Err(CategoryError::FoundationReply { code: 3, ref description })
                if description.is_empty()
        ));
    }
}
