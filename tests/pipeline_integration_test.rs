use chrono::{NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use weather_notifier::alert_state::{AlertStateStore, RainAlertState};
use weather_notifier::config::Config;
use weather_notifier::pipeline::Pipeline;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const MEMO_PATH: &str = "/v2/api/talk/memo/default/send";

struct Fixture {
    server: MockServer,
    dir: TempDir,
}

impl Fixture {
    async fn start() -> Self {
        let fixture = Self {
            server: MockServer::start().await,
            dir: TempDir::new().expect("Failed to create temp dir"),
        };
        std::fs::write(
            fixture.token_file(),
            r#"{"access_token":"token","refresh_token":"refresh"}"#,
        )
        .expect("Failed to write token file");
        fixture
    }

    fn token_file(&self) -> PathBuf {
        self.dir.path().join("tokens.json")
    }

    fn state_file(&self) -> PathBuf {
        self.dir.path().join("rain_state.json")
    }

    fn pipeline(&self) -> Pipeline {
        let yaml = format!(
            r#"
location:
  label: 서울
  air_station: 서울
forecast:
  service_key: kma-key
  village_url: {uri}/village
  ultra_short_url: {uri}/ultra
air_quality:
  service_key: air-key
  base_url: {uri}/air
kakao:
  rest_api_key: rest-key
  auth_url: {uri}
  api_url: {uri}
  token_file: "{tokens}"
advice:
  gender: male
rain_alert:
  state_file: "{state}"
"#,
            uri = self.server.uri(),
            tokens = self.token_file().display(),
            state = self.state_file().display()
        );
        Pipeline::new(Config::from_yaml(&yaml).expect("test config should parse"))
    }

    async fn mount_memo(&self, status: u16, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path(MEMO_PATH))
            .respond_with(ResponseTemplate::new(status))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    async fn sent_texts(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.url.path() == MEMO_PATH)
            .map(memo_text)
            .collect()
    }
}

fn memo_text(request: &Request) -> String {
    let template = url::form_urlencoded::parse(&request.body)
        .find(|(key, _)| key == "template_object")
        .map(|(_, value)| value.into_owned())
        .expect("memo request carries a template_object");

    let template: serde_json::Value =
        serde_json::from_str(&template).expect("template_object is JSON");
    assert_eq!(template["object_type"], "text");
    template["text"].as_str().unwrap_or_default().to_string()
}

fn at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 5)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn item(date: &str, time: &str, category: &str, value: &str) -> serde_json::Value {
    serde_json::json!({
        "category": category,
        "fcstDate": date,
        "fcstTime": time,
        "fcstValue": value
    })
}

fn envelope(items: Vec<serde_json::Value>) -> serde_json::Value {
    serde_json::json!({
        "response": {
            "header": { "resultCode": "00", "resultMsg": "NORMAL_SERVICE" },
            "body": { "items": { "item": items } }
        }
    })
}

async fn mount_village(server: &MockServer) {
    let items = vec![
        item("20240305", "0600", "TMN", "5.0"),
        item("20240305", "0800", "TMP", "7"),
        item("20240305", "0800", "SKY", "1"),
        item("20240305", "0800", "PTY", "0"),
        item("20240305", "0800", "POP", "10"),
        item("20240305", "1500", "TMP", "17"),
        item("20240305", "1500", "TMX", "18.0"),
        item("20240305", "1500", "SKY", "3"),
        item("20240305", "1500", "POP", "20"),
        item("20240306", "0900", "PTY", "0"),
        item("20240306", "0900", "POP", "20"),
    ];

    Mock::given(method("GET"))
        .and(path("/village"))
        .and(query_param("base_time", "0500"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(items)))
        .mount(server)
        .await;
}

async fn mount_air(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/air"))
        .and(query_param("stationName", "중구"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response": {
                "body": {
                    "items": [{
                        "dataTime": "2024-03-05 07:00",
                        "pm10Value": "95",
                        "pm25Value": "30",
                        "pm10Grade": "3",
                        "pm25Grade": "2"
                    }]
                }
            }
        })))
        .mount(server)
        .await;
}

async fn mount_ultra_short_rain(server: &MockServer) {
    let items = vec![
        item("20240305", "1500", "T1H", "12.7"),
        item("20240305", "1500", "PTY", "1"),
        item("20240305", "1600", "T1H", "11"),
        item("20240305", "1600", "PTY", "1"),
    ];

    Mock::given(method("GET"))
        .and(path("/ultra"))
        .and(query_param("base_time", "1430"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(items)))
        .mount(server)
        .await;
}

fn load_state(path: &Path) -> RainAlertState {
    AlertStateStore::new(path).load().expect("state should load")
}

#[tokio::test]
async fn test_daily_message_advice_order() {
    let fixture = Fixture::start().await;
    mount_village(&fixture.server).await;
    mount_air(&fixture.server).await;

    let message = fixture
        .pipeline()
        .compose_daily(at(7, 30))
        .await
        .unwrap()
        .expect("message should be composed");

    let expected_advice = "👔 오늘 코디: 가디건 + 셔츠, 슬랙스\n\
                           🧤 장갑 챙겨!\n\
                           일교차 13도니까 겉옷 챙겨! 🌡️\n\
                           미세먼지 나쁨, 마스크 챙겨! 😷\n\n";
    assert!(
        message.starts_with(expected_advice),
        "unexpected message:\n{}",
        message
    );
    assert!(message.contains("📍 서울 | 📅 03월 05일"));
    assert!(message.contains("🌡️ 최저 5°C / 최고 18°C"));
    assert!(message.contains("미세먼지 95㎍/㎥ 나쁨😷 | 초미세 30㎍/㎥ 보통🙂"));
    assert!(message.ends_with("⏰ 시간별 예보\n오전 8시 ☀️ 7°C\n오후 3시 ⛅ 17°C"));
}

#[tokio::test]
async fn test_daily_run_sends_message() {
    let fixture = Fixture::start().await;
    mount_village(&fixture.server).await;
    mount_air(&fixture.server).await;
    fixture.mount_memo(200, 1).await;

    let sent = fixture.pipeline().run_daily(at(7, 30)).await.unwrap();
    assert!(sent);

    let texts = fixture.sent_texts().await;
    assert_eq!(texts.len(), 1);
    assert!(texts[0].starts_with("👔 오늘 코디"));
}

/// Air quality failures only drop the air lines.
#[tokio::test]
async fn test_daily_run_without_air_quality() {
    let fixture = Fixture::start().await;
    mount_village(&fixture.server).await;
    Mock::given(method("GET"))
        .and(path("/air"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&fixture.server)
        .await;
    fixture.mount_memo(200, 1).await;

    assert!(fixture.pipeline().run_daily(at(7, 30)).await.unwrap());

    let texts = fixture.sent_texts().await;
    assert!(!texts[0].contains("마스크"));
    assert!(texts[0].contains("\n🌫️ \n"));
}

#[tokio::test]
async fn test_daily_run_without_forecast_sends_nothing() {
    let fixture = Fixture::start().await;
    Mock::given(method("GET"))
        .and(path("/village"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&fixture.server)
        .await;
    fixture.mount_memo(200, 0).await;

    let sent = fixture.pipeline().run_daily(at(7, 30)).await.unwrap();
    assert!(!sent);
}

#[tokio::test]
async fn test_rain_alert_sends_and_records_state() {
    let fixture = Fixture::start().await;
    mount_ultra_short_rain(&fixture.server).await;
    fixture.mount_memo(200, 1).await;

    let sent = fixture.pipeline().run_rain_alert(at(14, 50)).await.unwrap();
    assert!(sent);

    let texts = fixture.sent_texts().await;
    assert_eq!(texts, vec!["🌧️ 곧 비 올 예정! 우산 챙겨!\n🌡️ 현재 기온: 12.7°C"]);

    let state = load_state(&fixture.state_file());
    assert_eq!(state.last_alert_time, Some(at(14, 50)));
    assert_eq!(state.last_alert_type.as_deref(), Some("비"));
}

#[tokio::test]
async fn test_rain_alert_suppressed_within_cooldown() {
    let fixture = Fixture::start().await;
    mount_ultra_short_rain(&fixture.server).await;
    fixture.mount_memo(200, 0).await;

    let mut previous = RainAlertState::default();
    previous.record("비", at(13, 0));
    AlertStateStore::new(fixture.state_file())
        .save(&previous)
        .unwrap();

    let sent = fixture.pipeline().run_rain_alert(at(14, 50)).await.unwrap();
    assert!(!sent);
    assert_eq!(load_state(&fixture.state_file()), previous);
}

#[tokio::test]
async fn test_rain_alert_type_change_bypasses_cooldown() {
    let fixture = Fixture::start().await;
    mount_ultra_short_rain(&fixture.server).await;
    fixture.mount_memo(200, 1).await;

    let mut previous = RainAlertState::default();
    previous.record("눈", at(14, 0));
    AlertStateStore::new(fixture.state_file())
        .save(&previous)
        .unwrap();

    assert!(fixture.pipeline().run_rain_alert(at(14, 50)).await.unwrap());
    assert_eq!(
        load_state(&fixture.state_file()).last_alert_type.as_deref(),
        Some("비")
    );
}

#[tokio::test]
async fn test_rain_alert_failed_send_leaves_state_untouched() {
    let fixture = Fixture::start().await;
    mount_ultra_short_rain(&fixture.server).await;
    fixture.mount_memo(500, 1).await;

    let sent = fixture.pipeline().run_rain_alert(at(14, 50)).await.unwrap();
    assert!(!sent);
    assert!(!fixture.state_file().exists());
}

#[tokio::test]
async fn test_rain_alert_dry_window_sends_nothing() {
    let fixture = Fixture::start().await;
    Mock::given(method("GET"))
        .and(path("/ultra"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(vec![
            item("20240305", "1500", "PTY", "0"),
            item("20240305", "1600", "PTY", "1"),
        ])))
        .mount(&fixture.server)
        .await;
    fixture.mount_memo(200, 0).await;

    // 16:00 is 70 minutes out, beyond the default 60 minute window.
    let sent = fixture.pipeline().run_rain_alert(at(14, 50)).await.unwrap();
    assert!(!sent);
    assert!(!fixture.state_file().exists());
}
