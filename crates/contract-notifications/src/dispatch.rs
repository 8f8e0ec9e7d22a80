use super::Outcome;
use contract_models::InboundMessage;
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use validator::Validate;

/// Processor handles inbound messages of one type.
pub trait Processor: Send + Sync + 'static {
    type Message: InboundMessage;

    fn process<'s>(
        &'s self,
        message: Self::Message,
    ) -> impl std::future::Future<Output = anyhow::Result<Outcome>> + Send + 's;
}

/// An inbound message which could not be routed to a Processor.
#[derive(Debug, thiserror::Error)]
pub enum InvalidMessage {
    #[error("no processor is registered for message type {0:?}")]
    UnknownType(String),
    #[error("failed to decode {message_type}")]
    Decode {
        message_type: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{message_type} is invalid")]
    Validation {
        message_type: &'static str,
        #[source]
        source: validator::ValidationErrors,
    },
}

/// ObjSafe is an object-safe and type-erased trait which is implemented for all Processors.
trait ObjSafe: Send + Sync + 'static {
    fn message_type(&self) -> &'static str;

    fn dispatch<'s>(&'s self, body: &'s [u8]) -> BoxFuture<'s, anyhow::Result<Outcome>>;
}

impl<P: Processor> ObjSafe for P {
    fn message_type(&self) -> &'static str {
        <P::Message as InboundMessage>::MESSAGE_TYPE
    }

    fn dispatch<'s>(&'s self, body: &'s [u8]) -> BoxFuture<'s, anyhow::Result<Outcome>> {
        async move {
            let message_type = <P::Message as InboundMessage>::MESSAGE_TYPE;

            let message: P::Message = serde_json::from_slice(body)
                .map_err(|source| InvalidMessage::Decode {
                    message_type,
                    source,
                })?;
            message
                .validate()
                .map_err(|source| InvalidMessage::Validation {
                    message_type,
                    source,
                })?;

            P::process(self, message).await
        }
        .boxed()
    }
}

/// Dispatcher holds registered Processors and routes tagged messages to them.
#[derive(Default)]
pub struct Dispatcher(Vec<Arc<dyn ObjSafe>>);

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a Processor. Panics if a Processor for the same message type
    /// is already registered.
    pub fn register<P: Processor>(mut self, processor: P) -> Self {
        let message_type = <P::Message as InboundMessage>::MESSAGE_TYPE;

        let index = match self
            .0
            .binary_search_by_key(&message_type, |entry| entry.message_type())
        {
            Ok(_index) => panic!("a Processor for {message_type:?} is already registered"),
            Err(index) => index,
        };

        self.0.insert(index, Arc::new(processor));
        self
    }

    /// Message types which have a registered Processor, in sorted order.
    pub fn message_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|entry| entry.message_type())
    }

    /// Decode, validate, and process a message body of the given type.
    #[tracing::instrument(skip(self, body), fields(body_len = body.len()))]
    pub async fn dispatch(&self, message_type: &str, body: &[u8]) -> anyhow::Result<Outcome> {
        let Ok(index) = self
            .0
            .binary_search_by_key(&message_type, |entry| entry.message_type())
        else {
            return Err(InvalidMessage::UnknownType(message_type.to_string()).into());
        };

        let outcome = self.0[index].dispatch(body).await?;
        tracing::debug!(?outcome, "processed message");

        Ok(outcome)
    }
}
