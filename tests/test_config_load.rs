//! End-to-end config loading through the public API.

use std::fs;

use intake_portal::config::{self, ConfigSource};
use intake_portal::{ConfigResolver, ConfigValue, EnvSnapshot};
use reqwest::Url;
use tempfile::TempDir;

fn page_in(dir: &TempDir, rel: &str) -> Url {
    Url::from_file_path(dir.path().join(rel)).unwrap()
}

#[test]
fn shipped_config_parses_like_the_defaults() {
    let text = fs::read_to_string("config.yaml").expect("config.yaml missing at repo root");
    let parsed = config::parse(&text);
    let defaults = config::default_config(&EnvSnapshot::empty());
    assert_eq!(parsed, defaults, "config.yaml and built-in defaults drifted apart");
}

#[tokio::test]
async fn loads_config_next_to_the_page() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("config.yaml"),
        "api:\n  base_url: \"https://example.com\"\n  timeout: 5000\n  enabled: true\n",
    )
    .unwrap();

    let resolver = ConfigResolver::new(&page_in(&dir, "index.html"), EnvSnapshot::empty()).unwrap();
    assert!(resolver.get("api.base_url").is_none(), "lookups before load must miss");

    resolver.load_config().await;

    assert_eq!(resolver.get_value("api.base_url"), Some(ConfigValue::String("https://example.com".into())));
    assert_eq!(resolver.get_value("api.timeout"), Some(ConfigValue::Number(5000.0)));
    assert_eq!(resolver.get_value("api.enabled"), Some(ConfigValue::Bool(true)));
    assert!(resolver.get("api.base_url.scheme").is_none());
}

#[tokio::test]
async fn file_pages_are_not_local_hosts() {
    // A file URL has no host, so even dashboard pages read the same-directory file.
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("dashboard")).unwrap();
    fs::write(dir.path().join("dashboard/config.yaml"), "ui:\n  theme: dashboard\n").unwrap();
    fs::write(dir.path().join("config.yaml"), "ui:\n  theme: root\n").unwrap();

    let resolver =
        ConfigResolver::new(&page_in(&dir, "dashboard/index.html"), EnvSnapshot::empty()).unwrap();
    assert_eq!(resolver.source(), ConfigSource::SameDir);

    resolver.load_config().await;
    assert_eq!(resolver.get_str("ui.theme").as_deref(), Some("dashboard"));
}

#[tokio::test]
async fn missing_resource_uses_env_backed_defaults() {
    let dir = TempDir::new().unwrap();
    let env = EnvSnapshot::from_pairs([
        ("API_BASE_URL", "https://intake.internal/register"),
        ("PATIENT_DATA_UPDATE_FREQUENCY", "120000"),
    ]);

    let resolver = ConfigResolver::new(&page_in(&dir, "index.html"), env).unwrap();
    let loaded = resolver.load_config().await;

    assert!(loaded.section("api").is_some());
    assert_eq!(resolver.get_str("api.base_url").as_deref(), Some("https://intake.internal/register"));
    assert_eq!(resolver.get_number("patient.data_update_frequency"), Some(120_000.0));
    assert_eq!(resolver.get_str("twilio.account_sid").as_deref(), Some("YOUR_TWILIO_ACCOUNT_SID"));
}
