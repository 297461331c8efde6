//! スラッシュコマンド 1 件分の処理。
//!
//! 認証 → 入力の存在確認 → テキストの分割 → 測定値の数値変換 → 時刻の変換
//! → 保存 → 応答の生成、の順に実行し、途中で失敗した場合はそこで打ち切る。
//! 保存に失敗しても再試行はしない。

use std::num::ParseIntError;

use axum::http::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::auth::{AuthError, verify_webhook};
use crate::config::SlackConfig;
use crate::message::{ParseError, parse_message};
use crate::reply::{Message, format_reply};
use crate::storage::{Database, LogItem, StorageError};
use crate::time::{TimeError, resolve_timestamp};

/// スラッシュコマンド実行時に Slack から送られるフォーム。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlashCommand {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub token: String,
}

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("unauthorized webhook: {0}")]
    Auth(#[from] AuthError),
    #[error("missing form field: {0}")]
    MissingField(&'static str),
    #[error("cannot parse text: {0}")]
    Parse(#[from] ParseError),
    #[error("invalid measurement {value:?}: {source}")]
    InvalidMeasurement {
        value: String,
        source: ParseIntError,
    },
    #[error(transparent)]
    Time(#[from] TimeError),
    #[error("error in inserting item: {0}")]
    Storage(#[from] StorageError),
}

impl ProcessError {
    /// 呼び出し元に返す HTTP ステータス。
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::MissingField(_)
            | Self::Parse(_)
            | Self::InvalidMeasurement { .. }
            | Self::Time(TimeError::InvalidTimestamp(_)) => StatusCode::BAD_REQUEST,
            Self::Time(TimeError::UnknownTimezone(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Storage(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// 呼び出し元に返す短い説明。トークンや保存先の詳細は含めない。
    pub fn public_message(&self) -> String {
        match self {
            Self::Auth(_) => "webhook may be empty, missing, or unauthorized".to_string(),
            Self::MissingField(field) => format!("empty {field} in form"),
            Self::Parse(_) => "no measurement in text".to_string(),
            Self::InvalidMeasurement { value, .. } => {
                format!("measurement must be an integer, got {value:?}")
            }
            Self::Time(TimeError::InvalidTimestamp(_)) => "invalid request timestamp".to_string(),
            Self::Time(TimeError::UnknownTimezone(_)) => {
                "server time zone is misconfigured".to_string()
            }
            Self::Storage(_) => "error in processing request".to_string(),
        }
    }
}

/// 認証済みのリクエスト。1 回の処理の間だけ存在する。
pub struct Request<'a> {
    pub text: &'a str,
    pub user_id: &'a str,
    /// エポック秒（`X-Slack-Request-Timestamp` ヘッダーの値）
    pub timestamp: &'a str,
    pub area: &'a str,
    pub db: &'a dyn Database,
}

impl Request<'_> {
    /// テキストを解析してログを保存し、応答メッセージを返す。
    pub async fn process(&self) -> Result<Message, ProcessError> {
        let item = self.build_item()?;
        self.db.insert(&item).await?;
        Ok(format_reply(&item))
    }

    fn build_item(&self) -> Result<LogItem, ProcessError> {
        let parsed = parse_message(self.text)?;
        let log_measure =
            parsed
                .measure
                .parse::<i64>()
                .map_err(|source| ProcessError::InvalidMeasurement {
                    value: parsed.measure.clone(),
                    source,
                })?;
        let timestamp = resolve_timestamp(self.timestamp, self.area)?;

        Ok(LogItem {
            timestamp,
            user_id: self.user_id.to_string(),
            log_measure,
            notes: parsed.notes,
        })
    }
}

/// Slack から受け取ったコマンドを検証し、保存まで行う。
///
/// # Arguments
/// * `command` - 受信したフォーム
/// * `timestamp` - リクエストのタイムスタンプヘッダー
/// * `slack` - 期待するトークンとタイムゾーン
/// * `db` - 保存先
pub async fn handle_command(
    command: &SlashCommand,
    timestamp: &str,
    slack: &SlackConfig,
    db: &dyn Database,
) -> Result<Message, ProcessError> {
    verify_webhook(&command.token, &slack.token)?;

    if command.text.is_empty() {
        return Err(ProcessError::MissingField("text"));
    }
    if command.user_id.is_empty() {
        return Err(ProcessError::MissingField("user_id"));
    }

    let request = Request {
        text: &command.text,
        user_id: &command.user_id,
        timestamp,
        area: &slack.area,
        db,
    };
    request.process().await
}
