//! Mock metadata endpoint, media fixtures and config helpers

use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tiktok_dl::Config;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Bytes served as every fake video
pub const VIDEO_BYTES: &[u8] = b"\x00\x00\x00\x18ftypmp42integration-video";

/// Path the mock metadata endpoint is mounted on
pub const API_PATH: &str = "/api/";

/// Config pointing at `server` and saving into `dir`, with a short pacing delay
pub fn config_for(server: &MockServer, dir: &Path) -> Config {
    let mut config = Config::default();
    config.api.endpoint = format!("{}{}", server.uri(), API_PATH);
    config.download.download_dir = dir.to_path_buf();
    config.download.pacing_delay = Duration::from_millis(20);
    config.download.item_timeout = Some(Duration::from_secs(30));
    config
}

/// Answer metadata lookups for `page_url` with a playable video at `media_route`
pub async fn mount_video_page(
    server: &MockServer,
    page_url: &str,
    author: &str,
    title: &str,
    media_route: &str,
) {
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("url", page_url))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "msg": "success",
            "data": {
                "title": title,
                "hdplay": format!("{}{}", server.uri(), media_route),
                "author": {"unique_id": author}
            }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(media_route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(VIDEO_BYTES.to_vec()))
        .mount(server)
        .await;
}

/// Answer metadata lookups for `page_url` with an API-level failure
pub async fn mount_api_failure(server: &MockServer, page_url: &str, code: i64, msg: &str) {
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("url", page_url))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": code,
            "msg": msg
        })))
        .mount(server)
        .await;
}

/// Sorted names of the files in `dir`
pub fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
