//! スラッシュコマンドへの応答メッセージ。
//!
//! 形式は <https://api.slack.com/docs/message-formatting> を参照。

use serde::Serialize;

use crate::storage::LogItem;

const ACCENT_COLOR: &str = "#ef4631";
const TITLE: &str = "Burnout Barometer";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub response_type: String,
    pub text: String,
    pub attachments: Vec<Attachment>,
}

/// 添付情報。未使用の項目は空文字列のままシリアライズする。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub color: String,
    pub title: String,
    pub title_link: String,
    pub text: String,
    pub image_url: String,
}

/// 保存したログから、送信者にだけ見える応答を作る。
pub fn format_reply(item: &LogItem) -> Message {
    let attachment = Attachment {
        color: ACCENT_COLOR.to_string(),
        title: TITLE.to_string(),
        text: "Acknowledged".to_string(),
        ..Default::default()
    };

    Message {
        response_type: "ephemeral".to_string(),
        text: format!("Received: {} ({})", item.log_measure, item.notes),
        attachments: vec![attachment],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_reply_json() {
        let item = LogItem {
            timestamp: crate::time::resolve_timestamp("1609459200", "UTC").unwrap(),
            user_id: "U1".to_string(),
            log_measure: 3,
            notes: "feeling okay".to_string(),
        };

        let json = serde_json::to_value(format_reply(&item)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "response_type": "ephemeral",
                "text": "Received: 3 (feeling okay)",
                "attachments": [{
                    "color": "#ef4631",
                    "title": "Burnout Barometer",
                    "title_link": "",
                    "text": "Acknowledged",
                    "image_url": ""
                }]
            })
        );
    }

    #[test]
    fn test_format_reply_empty_notes() {
        let item = LogItem {
            timestamp: crate::time::resolve_timestamp("1609459200", "UTC").unwrap(),
            user_id: "U1".to_string(),
            log_measure: -2,
            notes: String::new(),
        };

        let reply = format_reply(&item);
        assert_eq!(reply.text, "Received: -2 ()");
        assert_eq!(reply.attachments.len(), 1);
    }
}
