//! End-to-end runs against a local mock server

use corpus_harvester::config::{
    Config, FilterConfig, InputConfig, RetryConfig, ScraperConfig, StorageConfig,
};
use corpus_harvester::run_scrape;
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Minimal valid 1x1 RGBA PNG
const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0xda, 0x63, 0xfc,
    0xcf, 0xc0, 0x50, 0x0f, 0x00, 0x04, 0x85, 0x01, 0x80, 0x84, 0xa9, 0x8c, 0x21, 0x00, 0x00,
    0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

fn test_config(output_dir: &Path, seeds: Vec<String>) -> Config {
    Config {
        scraper: ScraperConfig {
            output_dir: output_dir.to_string_lossy().to_string(),
            max_workers: 4,
            request_timeout: 5,
            rate_limit_delay: 0,
            user_agents: vec!["TestAgent/1.0".to_string()],
            robots_fail_open: true,
        },
        filters: FilterConfig {
            min_text_length: 100,
            allowed_languages: vec!["en".to_string()],
            blocklist_phrases: vec!["lorem ipsum".to_string()],
        },
        storage: StorageConfig {
            storage_formats: vec!["jsonl".to_string()],
            max_text_storage: 100,
            keep_image_metadata_on_write_failure: true,
        },
        retry: RetryConfig {
            retry_attempts: 1,
            retry_backoff: 0.0,
        },
        input: InputConfig { seeds },
    }
}

fn english_article() -> String {
    "The quick brown fox jumps over the lazy dog. ".repeat(10)
}

fn article_page(body_text: &str, extra: &str) -> String {
    format!(
        "<html><body><article><p>{}</p>{}</article></body></html>",
        body_text, extra
    )
}

async fn mount_no_robots(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

fn jsonl_outputs(dir: &Path) -> Vec<std::path::PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with("text_") && n.ends_with(".jsonl"))
                .unwrap_or(false)
        })
        .collect()
}

#[tokio::test]
async fn test_run_stores_good_page_and_survives_bad_seed() {
    let server = MockServer::start().await;
    mount_no_robots(&server).await;
    Mock::given(method("GET"))
        .and(path("/good"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(article_page(&english_article(), "")),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(
        dir.path(),
        vec![
            format!("{}/good", server.uri()),
            format!("{}/missing", server.uri()),
        ],
    );

    let summary = run_scrape(&config).await.unwrap();

    assert_eq!(summary.tasks, 2);
    assert_eq!(summary.stored, 1);
    assert_eq!(summary.failed, 1);

    // Exactly one final flush with exactly one record
    let outputs = jsonl_outputs(dir.path());
    assert_eq!(outputs.len(), 1);
    let content = std::fs::read_to_string(&outputs[0]).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1);

    let record: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(record["url"], format!("{}/good", server.uri()));
    assert!(record["content"]
        .as_str()
        .unwrap()
        .contains("quick brown fox"));
}

#[tokio::test]
async fn test_image_failures_do_not_affect_text_outcome() {
    let server = MockServer::start().await;
    mount_no_robots(&server).await;

    let imgs = format!(
        r#"<img src="{0}/ok.png"><img src="{0}/gone.png">"#,
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(article_page(&english_article(), &imgs)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ok.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(TINY_PNG))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gone.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), vec![format!("{}/page", server.uri())]);

    let summary = run_scrape(&config).await.unwrap();

    assert_eq!(summary.stored, 1);
    assert_eq!(summary.images_found, 2);
    assert_eq!(summary.images_acquired, 1);

    let image_files: Vec<_> = std::fs::read_dir(dir.path().join("images"))
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert_eq!(image_files.len(), 1);
    let name = image_files[0].file_name().to_string_lossy().to_string();
    assert!(name.ends_with(".png"));
    assert_eq!(
        std::fs::read(image_files[0].path()).unwrap(),
        TINY_PNG.to_vec()
    );
}

#[tokio::test]
async fn test_robots_disallow_skips_without_fetching() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/private/report"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(article_page(&english_article(), "")),
        )
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(
        dir.path(),
        vec![format!("{}/private/report", server.uri())],
    );

    let summary = run_scrape(&config).await.unwrap();

    assert_eq!(summary.tasks, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.stored, 0);
    assert!(jsonl_outputs(dir.path()).is_empty());
}

#[tokio::test]
async fn test_blocklisted_page_rejected_but_run_continues() {
    let server = MockServer::start().await;
    mount_no_robots(&server).await;

    let blocked = format!("{} Lorem Ipsum filler.", english_article());
    Mock::given(method("GET"))
        .and(path("/blocked"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(article_page(&blocked, "")),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/clean"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(article_page(&english_article(), "")),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(
        dir.path(),
        vec![
            format!("{}/blocked", server.uri()),
            format!("{}/clean", server.uri()),
        ],
    );

    let summary = run_scrape(&config).await.unwrap();

    assert_eq!(summary.stored, 1);
    assert_eq!(summary.rejected, 1);

    let outputs = jsonl_outputs(dir.path());
    assert_eq!(outputs.len(), 1);
    let content = std::fs::read_to_string(&outputs[0]).unwrap();
    assert_eq!(content.lines().count(), 1);
    assert!(content.contains("/clean"));
}

#[tokio::test]
async fn test_short_page_rejected() {
    let server = MockServer::start().await;
    mount_no_robots(&server).await;
    Mock::given(method("GET"))
        .and(path("/stub"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(article_page("Too short.", "")),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), vec![format!("{}/stub", server.uri())]);

    let summary = run_scrape(&config).await.unwrap();

    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.stored, 0);
    assert!(jsonl_outputs(dir.path()).is_empty());
}
