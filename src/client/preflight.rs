//! Preflight checks: everything that must hold before a request leaves the process.

use crate::client::config::ClientConfig;
use crate::protocol::{self, ProviderCapability};
use crate::types::RequestParameters;
use crate::{Error, Result};

/// Outcome of a successful preflight.
pub(crate) struct Cleared<'a> {
    pub capability: &'static ProviderCapability,
    pub api_key: &'a str,
}

/// Model, prompt and credential checks, in that order.
///
/// All failures here are configuration errors; no network action has happened.
pub(crate) fn preflight<'a>(
    config: &'a ClientConfig,
    params: &RequestParameters,
) -> Result<Cleared<'a>> {
    let capability = protocol::lookup(&params.model)?;

    if !params.prompt_message().is_some_and(|m| !m.is_blank()) {
        return Err(Error::EmptyPrompt);
    }

    let provider = capability.provider;
    let api_key = config
        .api_key(provider)
        .ok_or(Error::MissingCredential {
            provider,
            env_var: provider.api_key_env(),
        })?;

    Ok(Cleared {
        capability,
        api_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ProviderKind;
    use crate::types::ChatMessage;

    fn config() -> ClientConfig {
        ClientConfig::new().with_api_key(ProviderKind::Perplexity, "pplx-test")
    }

    #[test]
    fn unknown_model_checked_first() {
        let params = RequestParameters::new("mystery", vec![]);
        assert!(matches!(
            preflight(&config(), &params),
            Err(Error::UnknownModel { .. })
        ));
    }

    #[test]
    fn blank_prompt_rejected() {
        let params = RequestParameters::new(
            "sonar",
            vec![ChatMessage::system("be brief"), ChatMessage::user("  \n")],
        );
        assert!(matches!(preflight(&config(), &params), Err(Error::EmptyPrompt)));

        let system_only = RequestParameters::new("sonar", vec![ChatMessage::system("hi")]);
        assert!(matches!(
            preflight(&config(), &system_only),
            Err(Error::EmptyPrompt)
        ));
    }

    #[test]
    fn missing_credential_names_env_var() {
        let params = RequestParameters::new("gpt-5", vec![ChatMessage::user("hi")]);
        match preflight(&config(), &params) {
            Err(Error::MissingCredential { provider, env_var }) => {
                assert_eq!(provider, ProviderKind::OpenAi);
                assert_eq!(env_var, "OPENAI_API_KEY");
            }
            _ => panic!("expected MissingCredential"),
        }

        let params = RequestParameters::new("sonar", vec![ChatMessage::user("hi")]);
        assert!(preflight(&config(), &params).is_ok());
    }
}
