//! Capture to script conversion

use tracing::{debug, info, warn};

use crate::capture::{self, Exchange};
use crate::config::Config;
use crate::filter::ExchangeFilter;
use crate::params::{extract_params, UploadStore};
use crate::script::{Script, ScriptGenerator};
use crate::Result;

/// Converts a recorded capture directory into a FunkLoad script
pub struct Recorder {
    config: Config,
    filter: ExchangeFilter,
    uploads: UploadStore,
}

impl Recorder {
    /// Create a recorder for the given configuration
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            filter: ExchangeFilter::new(config.filter.clone()),
            uploads: UploadStore::new(config.upload_dir.clone()),
            config,
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Convert the capture directory
    ///
    /// Returns `None` when no user action survives filtering.
    ///
    /// # Errors
    ///
    /// Returns error on any capture integrity violation; no script is
    /// produced in that case
    pub fn convert(&self) -> Result<Option<Script>> {
        let exchanges = capture::load_exchanges(
            &self.config.capture_dir,
            &self.config.prefix,
            &self.config.limits,
        )?;
        info!("Loaded {} exchanges", exchanges.len());

        self.generate(exchanges)
    }

    /// Filter already loaded exchanges and generate the script
    ///
    /// # Errors
    ///
    /// Returns error if parameter extraction fails for a kept request
    pub fn generate(&self, exchanges: Vec<Exchange>) -> Result<Option<Script>> {
        let kept = self.filter.apply(exchanges);
        let Some(first) = kept.first() else {
            warn!("Sorry, no action recorded");
            return Ok(None);
        };

        let generator = ScriptGenerator::new(first.request.origin());
        debug!("Session server url: {}", generator.server_url());

        let instructions = kept
            .iter()
            .map(|exchange| {
                let request = &exchange.request;
                let params = if request.body().is_empty() {
                    None
                } else {
                    Some(extract_params(request, &self.uploads)?)
                };
                Ok(generator.instruction(request, params))
            })
            .collect::<Result<Vec<_>>>()?;

        info!("Generated {} replay instructions", instructions.len());
        Ok(Some(generator.finish(instructions)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LimitsConfig;
    use crate::params::Param;
    use crate::script::Target;
    use tempfile::TempDir;

    fn exchange(id: &str, request: &str, response: &str) -> Exchange {
        Exchange::from_bytes(
            id,
            request.as_bytes(),
            response.as_bytes(),
            &LimitsConfig::default(),
        )
        .unwrap()
    }

    fn recorder(dir: &TempDir) -> Recorder {
        let mut config = Config::new(dir.path());
        config.upload_dir = dir.path().to_path_buf();
        Recorder::new(config)
    }

    #[test]
    fn test_generate_uses_first_kept_origin() {
        let dir = TempDir::new().unwrap();
        let exchanges = vec![
            exchange(
                "1",
                "GET http://static.example.com/logo.png HTTP/1.1\r\n\r\n",
                "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\n\r\n",
            ),
            exchange(
                "2",
                "GET http://app.example.com/ HTTP/1.1\r\n\r\n",
                "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n",
            ),
            exchange(
                "3",
                "GET http://other.example.com/page HTTP/1.1\r\n\r\n",
                "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n",
            ),
        ];

        let script = recorder(&dir).generate(exchanges).unwrap().unwrap();
        assert_eq!(script.server_url(), "http://app.example.com");
        assert_eq!(
            script.instructions()[0].target,
            Target::Session("/".to_string())
        );
        assert_eq!(
            script.instructions()[1].target,
            Target::Absolute("http://other.example.com/page".to_string())
        );
    }

    #[test]
    fn test_generate_extracts_params_for_bodies() {
        let dir = TempDir::new().unwrap();
        let exchanges = vec![exchange(
            "1",
            "POST http://example.com/login HTTP/1.1\r\n\
             Content-Type: application/x-www-form-urlencoded\r\n\r\n\
             user=bob&pass=secret",
            "HTTP/1.1 302 Found\r\n\r\n",
        )];

        let script = recorder(&dir).generate(exchanges).unwrap().unwrap();
        assert_eq!(
            script.instructions()[0].params,
            Some(vec![
                Param::literal("user", "bob"),
                Param::literal("pass", "secret"),
            ])
        );
    }

    #[test]
    fn test_generate_nothing_kept() {
        let dir = TempDir::new().unwrap();
        let exchanges = vec![exchange(
            "1",
            "GET http://example.com/site.css HTTP/1.1\r\n\r\n",
            "HTTP/1.1 200 OK\r\nContent-Type: text/css\r\n\r\n",
        )];

        assert!(recorder(&dir).generate(exchanges).unwrap().is_none());
    }

    #[test]
    fn test_generate_missing_content_type_is_fatal() {
        let dir = TempDir::new().unwrap();
        let exchanges = vec![exchange(
            "1",
            "POST http://example.com/login HTTP/1.1\r\n\r\nuser=bob",
            "HTTP/1.1 200 OK\r\n\r\n",
        )];

        assert!(recorder(&dir).generate(exchanges).is_err());
    }
}
