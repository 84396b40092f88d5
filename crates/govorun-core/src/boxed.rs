//! BoxProvider -- object-safe dynamic dispatch wrapper for [`Provider`].
//!
//! 1. Define an object-safe `ProviderDyn` trait with boxed futures
//! 2. Blanket-impl `ProviderDyn` for all `T: Provider`
//! 3. `BoxProvider` wraps `Box<dyn ProviderDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use govorun_types::error::ProviderError;
use govorun_types::provider::{ProviderKind, RawResult, RequestPayload};

use crate::provider::Provider;

/// Object-safe version of [`Provider`] with a boxed future.
///
/// This trait exists solely to enable dynamic dispatch (`dyn ProviderDyn`).
/// A blanket implementation is provided for all types implementing
/// `Provider`.
pub trait ProviderDyn: Send + Sync {
    fn id(&self) -> &str;

    fn kind(&self) -> ProviderKind;

    fn send_boxed<'a>(
        &'a self,
        payload: &'a RequestPayload,
    ) -> Pin<Box<dyn Future<Output = Result<RawResult, ProviderError>> + Send + 'a>>;
}

/// Blanket implementation: any `Provider` automatically implements `ProviderDyn`.
impl<T: Provider> ProviderDyn for T {
    fn id(&self) -> &str {
        Provider::id(self)
    }

    fn kind(&self) -> ProviderKind {
        Provider::kind(self)
    }

    fn send_boxed<'a>(
        &'a self,
        payload: &'a RequestPayload,
    ) -> Pin<Box<dyn Future<Output = Result<RawResult, ProviderError>> + Send + 'a>> {
        Box::pin(self.send(payload))
    }
}

/// Type-erased provider for runtime chain assembly.
///
/// Since [`Provider`] uses RPITIT, it cannot be used as a trait object
/// directly. `BoxProvider` provides equivalent methods that delegate to the
/// inner `ProviderDyn` trait object.
pub struct BoxProvider {
    inner: Box<dyn ProviderDyn + Send + Sync>,
}

impl BoxProvider {
    /// Wrap a concrete `Provider` in a type-erased box.
    pub fn new<T: Provider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    /// Stable provider identifier.
    pub fn id(&self) -> &str {
        self.inner.id()
    }

    /// Capability this provider implements.
    pub fn kind(&self) -> ProviderKind {
        self.inner.kind()
    }

    /// Perform one request against the external service.
    pub async fn send(&self, payload: &RequestPayload) -> Result<RawResult, ProviderError> {
        self.inner.send_boxed(payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use govorun_types::provider::ChatReply;

    struct EchoProvider;

    impl Provider for EchoProvider {
        fn id(&self) -> &str {
            "echo"
        }

        fn kind(&self) -> ProviderKind {
            ProviderKind::Conversational
        }

        async fn send(&self, payload: &RequestPayload) -> Result<RawResult, ProviderError> {
            match payload {
                RequestPayload::Chat { messages, .. } => Ok(RawResult::Chat(ChatReply {
                    content: messages
                        .last()
                        .map(|turn| turn.content.clone())
                        .unwrap_or_default(),
                })),
                _ => Err(ProviderError::Invalid("unsupported payload kind".into())),
            }
        }
    }

    #[tokio::test]
    async fn test_box_provider_delegates() {
        let boxed = BoxProvider::new(EchoProvider);
        assert_eq!(boxed.id(), "echo");
        assert_eq!(boxed.kind(), ProviderKind::Conversational);

        let payload = RequestPayload::Chat {
            messages: vec![govorun_types::chat::ChatTurn::user("привет")],
            access_token: None,
        };
        let result = boxed.send(&payload).await.unwrap();
        assert_eq!(
            result,
            RawResult::Chat(ChatReply {
                content: "привет".into()
            })
        );
    }
}
