//! Slack のスラッシュコマンドで送られた測定値とメモを記録する Webhook サーバー。

pub mod auth;
pub mod config;
pub mod message;
pub mod pipeline;
pub mod reply;
pub mod server;
pub mod storage;
pub mod time;
