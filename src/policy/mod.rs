//! Per-domain robots.txt policy
//!
//! The gate fetches `{scheme}://{domain}/robots.txt` once per domain per run,
//! caches the parsed result, and answers whether a wildcard user agent may
//! fetch a given URL. An unreadable robots.txt permits the fetch by default
//! (fail-open) with a logged warning; the behavior is a deliberate tradeoff
//! favoring crawl progress over strict compliance and can be flipped with the
//! `robots-fail-open` configuration toggle.

mod rules;

pub use rules::RobotsRules;

use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

/// Wildcard user agent used for robots.txt evaluation
const ROBOTS_USER_AGENT: &str = "*";

/// Resolves robots.txt permission for a domain, with per-domain caching
pub struct PolicyGate {
    client: Client,
    cache: Mutex<HashMap<String, Arc<OnceCell<RobotsRules>>>>,
    fail_open: bool,
}

impl PolicyGate {
    /// Creates a policy gate backed by the shared HTTP client
    pub fn new(client: Client, fail_open: bool) -> Self {
        Self {
            client,
            cache: Mutex::new(HashMap::new()),
            fail_open,
        }
    }

    /// Returns whether a wildcard user agent may fetch `url` on `domain`
    ///
    /// The first call for a domain fetches and caches its robots.txt. The
    /// cache lock only resolves the per-domain slot; the fetch itself runs
    /// outside it, so one slow domain never blocks lookups for other domains
    /// while concurrent first access to the same domain still performs a
    /// single fetch. The cache lives for the run only.
    pub async fn permitted(&self, domain: &str, url: &str) -> bool {
        let slot = {
            let mut cache = self.cache.lock().await;
            cache
                .entry(domain.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let scheme = url::Url::parse(url)
            .ok()
            .map(|u| u.scheme().to_string())
            .unwrap_or_else(|| "https".to_string());

        let rules = slot
            .get_or_init(|| self.fetch_rules(&scheme, domain))
            .await;
        rules.is_allowed(url, ROBOTS_USER_AGENT)
    }

    /// Fetches and parses robots.txt for a domain
    ///
    /// A 4xx answer means the site publishes no rules, which conventionally
    /// allows everything. Server errors and network failures fall back to the
    /// configured fail-open/fail-closed behavior.
    async fn fetch_rules(&self, scheme: &str, domain: &str) -> RobotsRules {
        let robots_url = format!("{}://{}/robots.txt", scheme, domain);
        tracing::debug!("Fetching robots.txt: {}", robots_url);

        match self.client.get(&robots_url).send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(content) => RobotsRules::from_content(&content),
                Err(e) => self.fallback(domain, &format!("failed to read body: {}", e)),
            },
            Ok(response) if response.status().is_client_error() => {
                tracing::debug!("No robots.txt published on {} (HTTP {})", domain, response.status());
                RobotsRules::allow_all()
            }
            Ok(response) => self.fallback(domain, &format!("HTTP {}", response.status().as_u16())),
            Err(e) => self.fallback(domain, &e.to_string()),
        }
    }

    fn fallback(&self, domain: &str, reason: &str) -> RobotsRules {
        if self.fail_open {
            tracing::warn!(
                "Could not read robots.txt for {} ({}), permitting by fail-open policy",
                domain,
                reason
            );
            RobotsRules::allow_all()
        } else {
            tracing::warn!(
                "Could not read robots.txt for {} ({}), denying by fail-closed policy",
                domain,
                reason
            );
            RobotsRules::deny_all()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gate(fail_open: bool) -> PolicyGate {
        PolicyGate::new(Client::new(), fail_open)
    }

    fn server_domain(server: &MockServer) -> String {
        let uri = url::Url::parse(&server.uri()).unwrap();
        format!("{}:{}", uri.host_str().unwrap(), uri.port().unwrap())
    }

    #[tokio::test]
    async fn test_permitted_follows_rules() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private"),
            )
            .mount(&server)
            .await;

        let gate = gate(true);
        let domain = server_domain(&server);

        assert!(
            gate.permitted(&domain, &format!("{}/page", server.uri()))
                .await
        );
        assert!(
            !gate
                .permitted(&domain, &format!("{}/private/x", server.uri()))
                .await
        );
    }

    #[tokio::test]
    async fn test_robots_fetched_once_per_domain() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
            .expect(1)
            .mount(&server)
            .await;

        let gate = gate(true);
        let domain = server_domain(&server);

        for _ in 0..3 {
            assert!(
                gate.permitted(&domain, &format!("{}/page", server.uri()))
                    .await
            );
        }
    }

    #[tokio::test]
    async fn test_slow_domain_does_not_block_others() {
        use std::time::Duration;

        let slow = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(5))
                    .set_body_string("User-agent: *\nAllow: /"),
            )
            .mount(&slow)
            .await;

        let fast = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
            .mount(&fast)
            .await;

        let gate = Arc::new(gate(true));

        let slow_domain = server_domain(&slow);
        let slow_url = format!("{}/page", slow.uri());
        let slow_gate = gate.clone();
        let pending =
            tokio::spawn(async move { slow_gate.permitted(&slow_domain, &slow_url).await });

        // Give the slow fetch time to start and take its slot
        tokio::time::sleep(Duration::from_millis(100)).await;

        let fast_domain = server_domain(&fast);
        let permitted = tokio::time::timeout(
            Duration::from_secs(1),
            gate.permitted(&fast_domain, &format!("{}/page", fast.uri())),
        )
        .await
        .expect("fast domain was blocked behind another domain's robots fetch");
        assert!(permitted);

        pending.abort();
    }

    #[tokio::test]
    async fn test_missing_robots_allows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let gate = gate(true);
        let domain = server_domain(&server);
        assert!(
            gate.permitted(&domain, &format!("{}/page", server.uri()))
                .await
        );
    }

    #[tokio::test]
    async fn test_unreachable_robots_fail_open() {
        // Nothing listening on this domain
        let gate = gate(true);
        assert!(
            gate.permitted("localhost:1", "http://localhost:1/page")
                .await
        );
    }

    #[tokio::test]
    async fn test_unreachable_robots_fail_closed() {
        let gate = gate(false);
        assert!(
            !gate
                .permitted("localhost:1", "http://localhost:1/page")
                .await
        );
    }

    #[tokio::test]
    async fn test_server_error_fail_open() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let gate = gate(true);
        let domain = server_domain(&server);
        assert!(
            gate.permitted(&domain, &format!("{}/page", server.uri()))
                .await
        );
    }
}
