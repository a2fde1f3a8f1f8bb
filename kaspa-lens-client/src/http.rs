use crate::ClientError;
use reqwest::Url;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base: String,
}

impl UpstreamClient {
    pub fn new(http: reqwest::Client, base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        UpstreamClient { http, base }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    // 拼接路径段，每段单独做百分号编码
    pub fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = Url::parse(&self.base).map_err(|e| ClientError::Url(e.to_string()))?;

        url.path_segments_mut()
            .map_err(|_| ClientError::Url(self.base.clone()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = self.url(segments)?;
        tracing::debug!(%url, "upstream request");

        let response = self.http.get(url.clone()).query(query).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_segments_are_encoded() -> anyhow::Result<()> {
        let client = UpstreamClient::new(reqwest::Client::new(), "https://api-v2-do.kas.fyi/");
        let url = client.url(&["token", "krc20", "NA CHO/1", "info"])?;
        assert_eq!(
            url.as_str(),
            "https://api-v2-do.kas.fyi/token/krc20/NA%20CHO%2F1/info"
        );
        Ok(())
    }

    #[test]
    fn test_url_keeps_base_path() -> anyhow::Result<()> {
        let client = UpstreamClient::new(
            reqwest::Client::new(),
            "https://mainnet.krc721.stream/api/v1/krc721/mainnet",
        );
        let url = client.url(&["nfts"])?;
        assert_eq!(
            url.as_str(),
            "https://mainnet.krc721.stream/api/v1/krc721/mainnet/nfts"
        );
        Ok(())
    }
}
