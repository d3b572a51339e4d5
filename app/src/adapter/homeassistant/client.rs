use anyhow::Context as _;
use infrastructure::HttpClientConfig;
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;

use super::{EntityState, StateUpdate};

#[derive(Debug, Clone)]
pub struct HaHttpClient {
    client: ClientWithMiddleware,
    base_url: String,
}

impl HaHttpClient {
    pub fn new(url: &str, token: &str) -> anyhow::Result<Self> {
        let client = HttpClientConfig::new(Some(token.to_owned())).new_tracing_client()?;

        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_owned(),
        })
    }

    fn state_url(&self, entity_id: &str) -> String {
        format!("{}/api/states/{}", self.base_url, entity_id)
    }
}

impl HaHttpClient {
    /// Current state of the entity, `None` if Home Assistant doesn't know it.
    #[tracing::instrument(skip(self))]
    pub async fn get_state(&self, entity_id: &str) -> anyhow::Result<Option<EntityState>> {
        let response = self
            .client
            .get(self.state_url(entity_id))
            .send()
            .await
            .with_context(|| format!("Error requesting state of {}", entity_id))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = response
            .error_for_status()
            .with_context(|| format!("Error response for state of {}", entity_id))?;

        response
            .json::<EntityState>()
            .await
            .map(Some)
            .with_context(|| format!("Error parsing state of {}", entity_id))
    }

    #[tracing::instrument(skip(self, update))]
    pub async fn set_state(&self, entity_id: &str, update: &StateUpdate) -> anyhow::Result<()> {
        let response = self
            .client
            .post(self.state_url(entity_id))
            .json(update)
            .send()
            .await
            .with_context(|| format!("Error posting state of {}", entity_id))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Home Assistant rejected state of {}: {} - {}", entity_id, status, body);
        }

        tracing::debug!("Updated state of {}: {}", entity_id, update.state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_url_without_duplicate_slash() {
        let client = HaHttpClient::new("http://localhost:8123/", "token").unwrap();

        assert_eq!(
            client.state_url("sensor.nibe_prod_heating"),
            "http://localhost:8123/api/states/sensor.nibe_prod_heating"
        );
    }
}
