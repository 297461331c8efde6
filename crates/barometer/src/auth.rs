//! Slack から送られるトークンの検証。

use sha2::{Digest as _, Sha256};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("empty form token")]
    EmptyToken,
    #[error("invalid request/credentials: {0:?}")]
    TokenMismatch(String),
}

/// フォームのトークンが設定済みのトークンと一致するか検証する。
pub fn verify_webhook(token: &str, expected: &str) -> Result<(), AuthError> {
    if token.is_empty() {
        return Err(AuthError::EmptyToken);
    }

    if !digest_eq(token, expected) {
        return Err(AuthError::TokenMismatch(token.to_string()));
    }

    Ok(())
}

/// 長さに依存せず一定時間で比較するため、ダイジェスト同士を比較する。
fn digest_eq(a: &str, b: &str) -> bool {
    let a = Sha256::digest(a.as_bytes());
    let b = Sha256::digest(b.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
