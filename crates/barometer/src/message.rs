//! スラッシュコマンドのテキストを測定値とメモに分割する。

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("no measurement found in text")]
    Empty,
}

/// テキストを分割した結果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    /// 先頭トークン（数値かどうかはまだ検証していない）
    pub measure: String,
    /// 残りのトークンを半角スペースで連結したもの
    pub notes: String,
}

/// テキストを空白で分割し、先頭トークンを測定値、残りをメモとして返す。
pub fn parse_message(text: &str) -> Result<ParsedMessage, ParseError> {
    let mut tokens = text.split_whitespace();
    let measure = tokens.next().ok_or(ParseError::Empty)?;
    let notes = tokens.collect::<Vec<_>>().join(" ");

    Ok(ParsedMessage {
        measure: measure.to_string(),
        notes,
    })
}
