//! Chat notification client (Slack Web API)
//!
//! Thin reqwest adapter: plain text posts, file upload, and the
//! interactive tagging prompt posted after a successful upload. Inbound
//! button callbacks are handled elsewhere and are out of scope here.

use crate::{Error, Result};
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use std::time::Duration;

const API_BASE: &str = "https://slack.com/api";

/// Button payload for the tagging prompt. Serialized to a JSON string and
/// carried in the button value.
#[derive(Debug, Clone, Serialize)]
pub struct TagPayload {
    pub occupied: bool,
    pub file_id: String,
    pub filename: String,
}

/// A file accepted by the chat service
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub id: String,
    pub title: String,
}

/// Chat client bound to a bot token and an alerts channel
pub struct SlackNotifier {
    client: reqwest::Client,
    token: String,
    channel: String,
}

impl SlackNotifier {
    pub fn new(token: impl Into<String>, channel: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            token: token.into(),
            channel: channel.into(),
        }
    }

    /// Post a plain text message to the alerts channel
    pub async fn post_message(&self, text: &str) -> Result<()> {
        let resp = self
            .client
            .post(format!("{}/chat.postMessage", API_BASE))
            .bearer_auth(&self.token)
            .json(&json!({ "channel": self.channel, "text": text }))
            .send()
            .await?;
        Self::check_ok(resp.json().await?)?;
        tracing::debug!("Chat message posted");
        Ok(())
    }

    /// Upload a local file to the alerts channel
    pub async fn upload_file(&self, path: &Path, title: Option<&str>) -> Result<UploadedFile> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("capture")
            .to_string();
        let title = title.unwrap_or(&filename).to_string();
        let data = tokio::fs::read(path).await?;

        let form = reqwest::multipart::Form::new()
            .text("channels", self.channel.clone())
            .text("title", title.clone())
            .part(
                "file",
                reqwest::multipart::Part::bytes(data).file_name(filename),
            );

        let resp = self
            .client
            .post(format!("{}/files.upload", API_BASE))
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await?;
        let body = Self::check_ok(resp.json().await?)?;

        let id = body["file"]["id"]
            .as_str()
            .ok_or_else(|| Error::Api("upload response missing file id".to_string()))?
            .to_string();
        tracing::info!(file_id = %id, title = %title, "File uploaded to chat");
        Ok(UploadedFile { id, title })
    }

    /// Post the follow-up message with the two mutually exclusive tagging
    /// buttons for an uploaded image
    pub async fn post_tagging_prompt(&self, file: &UploadedFile) -> Result<()> {
        let blocks = tagging_blocks(file)?;
        let resp = self
            .client
            .post(format!("{}/chat.postMessage", API_BASE))
            .bearer_auth(&self.token)
            .json(&json!({
                "channel": self.channel,
                "text": format!("Tag Image {}", file.title),
                "blocks": blocks,
            }))
            .send()
            .await?;
        Self::check_ok(resp.json().await?)?;
        Ok(())
    }

    /// Endpoint responded; a `"ok": false` body is an application failure
    fn check_ok(body: serde_json::Value) -> Result<serde_json::Value> {
        if body["ok"].as_bool().unwrap_or(false) {
            Ok(body)
        } else {
            let detail = body["error"].as_str().unwrap_or("unknown").to_string();
            Err(Error::Api(detail))
        }
    }
}

/// Block kit payload for the tagging prompt
fn tagging_blocks(file: &UploadedFile) -> Result<serde_json::Value> {
    let button = |label: &str, style: &str, occupied: bool| -> Result<serde_json::Value> {
        let value = serde_json::to_string(&TagPayload {
            occupied,
            file_id: file.id.clone(),
            filename: file.title.clone(),
        })?;
        Ok(json!({
            "type": "button",
            "text": { "type": "plain_text", "text": label, "emoji": true },
            "style": style,
            "value": value,
        }))
    };

    let occupied = button("Occupied", "primary", true)?;
    let unoccupied = button("Unoccupied", "danger", false)?;

    Ok(json!([
        {
            "type": "section",
            "text": { "type": "mrkdwn", "text": format!("*Tag Image {}*", file.title) }
        },
        {
            "type": "section",
            "text": { "type": "mrkdwn", "text": "How should this image be tagged?" }
        },
        {
            "type": "actions",
            "elements": [occupied, unoccupied]
        }
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagging_blocks_carry_exclusive_payloads() {
        let file = UploadedFile {
            id: "F123".to_string(),
            title: "door.png".to_string(),
        };
        let blocks = tagging_blocks(&file).unwrap();
        let elements = blocks[2]["elements"].as_array().unwrap();
        assert_eq!(elements.len(), 2);

        let occupied: TagPayloadOwned =
            serde_json::from_str(elements[0]["value"].as_str().unwrap()).unwrap();
        let unoccupied: TagPayloadOwned =
            serde_json::from_str(elements[1]["value"].as_str().unwrap()).unwrap();

        assert!(occupied.occupied);
        assert!(!unoccupied.occupied);
        assert_eq!(occupied.file_id, "F123");
        assert_eq!(occupied.filename, "door.png");
        assert_eq!(elements[0]["style"], "primary");
        assert_eq!(elements[1]["style"], "danger");
    }

    #[derive(serde::Deserialize)]
    struct TagPayloadOwned {
        occupied: bool,
        file_id: String,
        filename: String,
    }
}
