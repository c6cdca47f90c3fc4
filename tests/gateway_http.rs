//! End-to-end tests for the HTTP surface.
//!
//! The gateway runs on an ephemeral port. LLM, price API and news feed are
//! `wiremock` upstreams; web search results and pages come from an
//! in-memory [`PageFetcher`].

use std::collections::HashMap;
use std::sync::Arc;

use intel_gateway::config::GatewayConfig;
use intel_gateway::{
    ActivityLog, AppState, ChatCompletionsClient, CoinGeckoClient, GatewayServer, Pipeline,
};
use intel_search::{
    BlockingPool, MultiSourceSearcher, PageFetcher, ParallelScraper, SearchConfig, SearchError,
};
use serde_json::{Value, json};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-intel-key";
const WEB_SEARCH_URL: &str = "https://html.duckduckgo.test/html/";
const FACTS: &str = "hello, world, €€€";

const DDG_HTML: &str = r#"<html><body>
<div class="result web-result">
  <h2 class="result__title"><a class="result__a" href="https://alpha.example.com/report">Alpha report</a></h2>
  <a class="result__snippet">Alpha publishes the full quarterly numbers.</a>
</div>
<div class="result web-result">
  <h2 class="result__title"><a class="result__a" href="https://beta.example.org/analysis">Beta analysis</a></h2>
  <a class="result__snippet">Beta looks at what the numbers mean.</a>
</div>
</body></html>"#;

const NEWS_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
  <item>
    <title>Alpha follow-up</title>
    <link>https://alpha.example.com/follow-up</link>
    <pubDate>Tue, 07 Jan 2025 08:00:00 GMT</pubDate>
  </item>
  <item>
    <title>Gamma breaking story</title>
    <link>https://gamma.example.net/story</link>
    <pubDate>Tue, 07 Jan 2025 09:00:00 GMT</pubDate>
  </item>
</channel></rss>"#;

/// Serves the canned DuckDuckGo page for search URLs and known pages by URL.
struct StubWeb {
    pages: HashMap<&'static str, String>,
}

impl StubWeb {
    fn new() -> Self {
        let article = |name: &str| {
            format!(
                "<html><body><nav>Home | About</nav><article><p>{name} says revenue rose 12% to $4.1B in the fourth quarter.</p></article></body></html>"
            )
        };
        let mut pages = HashMap::new();
        pages.insert("https://alpha.example.com/report", article("Alpha"));
        pages.insert("https://beta.example.org/analysis", article("Beta"));
        // gamma.example.net is deliberately unreachable.
        Self { pages }
    }
}

impl PageFetcher for StubWeb {
    fn fetch(&self, url: &str) -> Result<String, SearchError> {
        if url.starts_with(WEB_SEARCH_URL) {
            return Ok(DDG_HTML.to_owned());
        }
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| SearchError::Http("status 404".into()))
    }
}

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    }))
}

async fn mount_upstreams(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("You select URLs"))
        .respond_with(completion("0, 2"))
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion(FACTS))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rss/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(NEWS_RSS))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .and(query_param("ids", "bitcoin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bitcoin": {"usd": 97000.5, "usd_24h_change": 1.25}
        })))
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/hit-target"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("pong", "text/plain"))
        .mount(server)
        .await;
}

struct Harness {
    gateway: GatewayServer,
    upstream: MockServer,
    client: reqwest::Client,
}

impl Harness {
    async fn start() -> Self {
        let upstream = MockServer::start().await;
        mount_upstreams(&upstream).await;

        let mut config = GatewayConfig::default();
        config.server.host = "127.0.0.1".into();
        config.server.port = 0;
        config.llm.api_url = format!("{}/v1/chat/completions", upstream.uri());
        config.llm.api_key = "llm-key".into();
        config.price.api_url = format!("{}/simple/price", upstream.uri());
        config.auth.api_key = API_KEY.into();
        config.search = SearchConfig {
            web_search_url: WEB_SEARCH_URL.into(),
            news_feed_url: format!("{}/rss/search", upstream.uri()),
            fetch_timeout_seconds: 5,
            feed_timeout_seconds: 5,
            ..SearchConfig::default()
        };
        config.validate().expect("valid config");

        let fetcher: Arc<dyn PageFetcher> = Arc::new(StubWeb::new());
        let pool = BlockingPool::new(config.search.scrape_workers);
        let searcher =
            MultiSourceSearcher::from_config(Arc::clone(&fetcher), pool.clone(), &config.search)
                .expect("searcher");
        let scraper = ParallelScraper::new(fetcher, pool, &config.search);
        let llm = Arc::new(ChatCompletionsClient::new(&config.llm).expect("llm client"));
        let prices = Arc::new(CoinGeckoClient::new(&config.price).expect("price client"));
        let pipeline = Arc::new(Pipeline::new(searcher, scraper, llm, prices));
        let activity = Arc::new(ActivityLog::new(config.activity.capacity));

        let state = AppState::new(pipeline, activity, &config).expect("state");
        let gateway = GatewayServer::start(state, &config.server)
            .await
            .expect("server starts");

        Self {
            gateway,
            upstream,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.gateway.addr())
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let response = self.client.get(self.url(path)).send().await.expect("request");
        let status = response.status().as_u16();
        (status, response.json().await.expect("json body"))
    }

    async fn intel(&self, key: Option<&str>, body: &str) -> (u16, Value) {
        let mut request = self
            .client
            .post(self.url("/api/intel"))
            .header("content-type", "application/json")
            .body(body.to_owned());
        if let Some(key) = key {
            request = request.header("X-Api-Key", key);
        }
        let response = request.send().await.expect("request");
        let status = response.status().as_u16();
        (status, response.json().await.expect("json body"))
    }

    async fn synthesis_prompts(&self) -> Vec<String> {
        self.upstream
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == "/v1/chat/completions")
            .map(|r| String::from_utf8_lossy(&r.body).into_owned())
            .filter(|body| !body.contains("You select URLs"))
            .collect()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn health_reports_service_and_model() {
    let h = Harness::start().await;
    let (status, body) = h.get("/health").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "intel-gateway");
    assert_eq!(body["model"], "deepseek-ai/DeepSeek-V3");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn ask_runs_the_whole_pipeline() {
    let h = Harness::start().await;
    let (status, body) = h.get("/ask?q=bitcoin%20price%20today").await;
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["answer"], FACTS);
    assert_eq!(body["scraped_count"], 2);
    assert_eq!(
        body["sources"],
        json!(["https://alpha.example.com/report", "https://gamma.example.net/story"])
    );
    assert!(body["elapsed"].is_number());

    let prompts = h.synthesis_prompts().await;
    assert_eq!(prompts.len(), 1);
    let prompt = &prompts[0];
    assert!(prompt.contains("LIVE DATA: bitcoin price is $97,000.50 USD"));
    assert!(prompt.contains("Alpha says revenue rose 12%"));
    assert!(!prompt.contains("gamma.example.net/story ---"));
    // The news duplicate of alpha.example.com was merged away.
    assert!(!prompt.contains("Alpha follow-up"));
    assert!(prompt.contains("Gamma breaking story"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn intel_requires_api_key() {
    let h = Harness::start().await;
    let (status, body) = h.intel(None, r#"{"query":"q"}"#).await;
    assert_eq!(status, 401);
    assert_eq!(body, json!({"ok": false, "e": "unauthorized"}));

    let (status, _) = h.intel(Some("wrong"), r#"{"query":"q"}"#).await;
    assert_eq!(status, 401);

    let (status, _) = h.get("/api/log").await;
    assert_eq!(status, 401);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn intel_validates_body() {
    let h = Harness::start().await;
    let (status, body) = h.intel(Some(API_KEY), "{not json").await;
    assert_eq!((status, body["e"].as_str()), (400, Some("invalid json")));

    let (status, body) = h.intel(Some(API_KEY), r#"{"mode":"search"}"#).await;
    assert_eq!((status, body["e"].as_str()), (400, Some("missing query")));

    let (status, body) = h.intel(Some(API_KEY), r#"{"query":"x","mode":"browse"}"#).await;
    assert_eq!((status, body["e"].as_str()), (400, Some("missing url")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn intel_search_respects_byte_budget() {
    let h = Harness::start().await;
    let (status, body) = h
        .intel(Some(API_KEY), r#"{"query":"quarterly revenue","max_bytes":10}"#)
        .await;
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["ok"], true);
    assert_eq!(body["f"], "hello, wor");
    assert_eq!(body["s"], json!(["alpha.example.com", "gamma.example.net"]));
    assert!(body["t"].as_u64().is_some_and(|t| t > 1_700_000_000));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn intel_price_mode_skips_search() {
    let h = Harness::start().await;
    let (status, body) = h.intel(Some(API_KEY), r#"{"mode":"price","query":"BTC"}"#).await;
    assert_eq!(status, 200);
    assert_eq!(body["f"], "bitcoin $97,000.50 (+1.25% 24h) (coingecko)");
    assert_eq!(body["s"], json!(["coingecko.com"]));
    assert!(h.synthesis_prompts().await.is_empty());

    let (status, body) = h
        .intel(Some(API_KEY), r#"{"mode":"price","query":"BTC","max_bytes":10}"#)
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["f"], "bitcoin $9");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn intel_browse_failure_is_soft() {
    let h = Harness::start().await;
    let (status, body) = h
        .intel(
            Some(API_KEY),
            r#"{"mode":"browse","query":"x","url":"https://gamma.example.net/story"}"#,
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["ok"], false);
    assert_eq!(body["e"], "scrape failed: HTTP error: status 404");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn intel_browse_extracts_page_facts() {
    let h = Harness::start().await;
    let (status, body) = h
        .intel(
            Some(API_KEY),
            r#"{"mode":"browse","query":"x","url":"https://beta.example.org/analysis","max_bytes":5000}"#,
        )
        .await;
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["f"], FACTS);
    assert_eq!(body["s"], json!(["beta.example.org"]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn search_endpoint_lists_or_summarizes() {
    let h = Harness::start().await;
    let (status, body) = h.get("/search?q=quarterly&raw=true").await;
    assert_eq!(status, 200);
    assert_eq!(body["results"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["results"][0]["url"], "https://alpha.example.com/report");

    let (status, body) = h.get("/search?q=quarterly").await;
    assert_eq!(status, 200);
    assert_eq!(body["summary"], FACTS);
    assert_eq!(body["result_count"], 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn browse_endpoint_returns_raw_text() {
    let h = Harness::start().await;
    let (status, body) = h
        .get("/browse?url=https%3A%2F%2Fbeta.example.org%2Fanalysis&raw=true")
        .await;
    assert_eq!(status, 200);
    let content = body["content"].as_str().unwrap_or_default();
    assert!(content.contains("Beta says revenue rose"));
    assert!(!content.contains("Home | About"));

    let (status, body) = h.get("/browse?url=https%3A%2F%2Fnowhere.example%2F").await;
    assert_eq!(status, 500);
    assert!(body["error"].as_str().is_some_and(|e| e.contains("404")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn price_endpoint_quotes_or_reports_unknown() {
    let h = Harness::start().await;
    let (status, body) = h.get("/price").await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"coin": "bitcoin", "price_usd": 97000.5, "change_24h": 1.25}));

    let (status, body) = h.get("/price?coin=dogecoin").await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"error": "Coin 'dogecoin' not found"}));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn hit_reports_status_and_length() {
    let h = Harness::start().await;
    let target = format!("{}/hit-target", h.upstream.uri());
    let (status, body) = h.get(&format!("/hit?url={target}")).await;
    assert_eq!(status, 200);
    assert_eq!(body["status_code"], 200);
    assert_eq!(body["content_type"], "text/plain");
    assert_eq!(body["content_length"], 4);
    assert_eq!(body["headers"]["content-type"], "text/plain");

    let (status, body) = h.get("/hit?url=http://127.0.0.1:9/").await;
    assert_eq!(status, 502);
    assert!(body["error"].is_string());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn activity_log_records_requests_newest_first() {
    let h = Harness::start().await;
    h.get("/price").await;
    h.intel(Some(API_KEY), r#"{"mode":"price"}"#).await;

    let response = h
        .client
        .get(h.url("/api/log"))
        .header("X-Api-Key", API_KEY)
        .send()
        .await
        .expect("request");
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("json");
    let log = body["log"].as_array().cloned().unwrap_or_default();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0]["action"], "intel");
    assert_eq!(log[0]["detail"], "price:bitcoin");
    assert_eq!(log[1]["action"], "price");
    assert_eq!(log[1]["status"], "ok");
}
