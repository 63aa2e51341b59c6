//! Provider registry mapping element names to decoders.

use std::collections::HashMap;
use std::io::BufRead;

use super::handler::ElementDecoder;
use super::types::{DecodedElement, Provider};
use crate::error::{DecodeError, Result};
use crate::xml::{StartTag, XmlStream};

/// Registry mapping `(element, namespace)` pairs to decoders.
///
/// The dispatcher pulls a start tag, looks up its provider and hands the
/// stream over. Elements without a provider are rejected.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<(String, String), Provider>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Register a provider for an element in a namespace.
    ///
    /// A later registration for the same pair replaces the earlier one.
    pub fn register(
        &mut self,
        element: impl Into<String>,
        namespace: impl Into<String>,
        provider: Provider,
    ) {
        self.providers
            .insert((element.into(), namespace.into()), provider);
    }

    /// Get the provider for an element.
    #[must_use]
    pub fn get_provider(&self, element: &str, namespace: &str) -> Option<&Provider> {
        self.providers
            .get(&(element.to_string(), namespace.to_string()))
    }

    /// Check if a provider is registered for an element.
    #[must_use]
    pub fn has_provider(&self, element: &str, namespace: &str) -> bool {
        self.get_provider(element, namespace).is_some()
    }

    /// Number of registered providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Decode the element that starts with `start`.
    ///
    /// # Errors
    /// `UnknownElement` when no provider is registered, otherwise whatever
    /// the provider returns.
    pub fn decode_element<R: BufRead>(
        &self,
        stream: &mut XmlStream<R>,
        start: &StartTag,
    ) -> Result<DecodedElement> {
        let provider = self
            .get_provider(&start.name, &start.namespace)
            .ok_or_else(|| DecodeError::UnknownElement {
                name: start.name.clone(),
                namespace: start.namespace.clone(),
            })?;

        tracing::trace!(element = %start.name, namespace = %start.namespace, "Dispatching element");

        match provider {
            Provider::Command(decoder) => decoder.decode(stream, start).map(DecodedElement::Command),
            Provider::SpecificError(decoder) => decoder
                .decode(stream, start)
                .map(DecodedElement::SpecificError),
        }
    }

    /// Pull the next start tag from the stream and decode it.
    ///
    /// # Errors
    /// `EmptyDocument` when the stream holds no further element.
    pub fn decode<R: BufRead>(&self, stream: &mut XmlStream<R>) -> Result<DecodedElement> {
        let start = stream.next_start()?.ok_or(DecodeError::EmptyDocument)?;
        self.decode_element(stream, &start)
    }
}
