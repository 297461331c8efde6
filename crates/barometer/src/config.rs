use anyhow::{Context, Result, anyhow, ensure};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::storage::BackendKind;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub slack: SlackConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SlackConfig {
    /// スラッシュコマンドの検証トークン
    pub token: String,
    /// 時刻の変換に使う IANA タイムゾーン名
    #[serde(default = "default_area")]
    pub area: String,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            token: "YOUR_SLACK_VERIFICATION_TOKEN".to_string(),
            area: default_area(),
        }
    }
}

fn default_area() -> String {
    "UTC".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StorageConfig {
    /// 保存先 URL。スキームで保存先の種類を選ぶ
    pub url: String,
    /// BigQuery 用のアクセストークン。未設定ならメタデータサーバーから取得する
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// BigQuery API のベース URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// アクセストークンを取得するメタデータサーバーの URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_url: Option<String>,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: "bigquery://YOUR_PROJECT/barometer/logs".to_string(),
            access_token: None,
            endpoint: None,
            metadata_url: None,
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

impl Config {
    /// 起動時に検出できる設定ミスをまとめて検査する。
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.slack.token.is_empty(), "slack.token must not be empty");
        self.slack
            .area
            .parse::<Tz>()
            .map_err(|e| anyhow!("{e}"))
            .context("Invalid slack.area")?;
        BackendKind::from_url(&self.storage.url).context("Invalid storage.url")?;
        Ok(())
    }
}

pub fn open_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
    let config: Config = toml::from_str(&content).context("Failed to parse configuration file")?;
    Ok(config)
}

pub fn write_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let content =
        toml::to_string_pretty(&Config::default()).context("Failed to serialize configuration")?;
    fs::write(path.as_ref(), content).context("Failed to write configuration file")?;
    Ok(())
}
