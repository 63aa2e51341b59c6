//! Registry configuration for the ad-hoc commands namespace.

use super::core::ProviderRegistry;
use super::types::Provider;
use crate::command::CommandResultDecoder;
use crate::config::{DecoderConfig, COMMANDS_NAMESPACE, COMMAND_ELEMENT};
use crate::specific_error::SpecificErrorDecoder;

/// Create a registry with every provider of the commands namespace.
///
/// Registers `<command/>` and one specific-error decoder per condition
/// element (`bad-action`, `malformed-action`, `bad-locale`, `bad-payload`,
/// `bad-sessionid`, `session-expired`).
///
/// # Examples
/// ```
/// use xmpp_adhoc_commands::config::{DecoderConfig, COMMANDS_NAMESPACE};
/// use xmpp_adhoc_commands::registry::create_command_registry;
///
/// let registry = create_command_registry(DecoderConfig::default());
/// assert!(registry.has_provider("command", COMMANDS_NAMESPACE));
/// assert!(registry.has_provider("session-expired", COMMANDS_NAMESPACE));
/// ```
#[must_use]
pub fn create_command_registry(config: DecoderConfig) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();

    registry.register(
        COMMAND_ELEMENT,
        COMMANDS_NAMESPACE,
        Provider::Command(CommandResultDecoder::with_config(config)),
    );

    for decoder in SpecificErrorDecoder::all() {
        registry.register(
            decoder.element_name(),
            COMMANDS_NAMESPACE,
            Provider::SpecificError(decoder),
        );
    }

    registry
}
