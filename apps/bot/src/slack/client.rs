use std::time::Duration;

use anyhow::{Result, bail};
use coin::{Reply, presenter::Attachment};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const SLACK_API: &str = "https://slack.com/api";

#[derive(Clone)]
pub struct SlackClient {
    client: Client,
    token: String,
    base_api: String,
}

//
// chat.postMessage
// https://api.slack.com/methods/chat.postMessage
//
#[derive(Debug, Serialize)]
struct PostMessage<'a> {
    channel: &'a str,

    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,

    #[serde(skip_serializing_if = "no_attachments")]
    attachments: &'a [Attachment],

    #[serde(skip_serializing_if = "Option::is_none")]
    thread_ts: Option<&'a str>,
}

fn no_attachments(attachments: &&[Attachment]) -> bool {
    attachments.is_empty()
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl<'a> PostMessage<'a> {
    fn new(channel: &'a str, thread_ts: Option<&'a str>, reply: &'a Reply) -> Self {
        let (text, attachments) = match reply {
            Reply::Text(text) => (Some(text.as_str()), &[][..]),
            Reply::Attachment(card) => (None, std::slice::from_ref(card)),
        };

        Self {
            channel,
            text,
            attachments,
            thread_ts,
        }
    }
}

impl SlackClient {
    pub fn new(token: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            token,
            base_api: SLACK_API.to_string(),
        })
    }

    /// Post a reply into `channel`, threaded under `thread_ts` when given.
    pub async fn post_reply(
        &self,
        channel: &str,
        thread_ts: Option<&str>,
        reply: &Reply,
    ) -> Result<()> {
        let body = PostMessage::new(channel, thread_ts, reply);

        let res: ApiResponse = self
            .client
            .post(format!("{}/chat.postMessage", self.base_api))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !res.ok {
            bail!(
                "chat.postMessage rejected: {}",
                res.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }

        debug!(channel, "reply posted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use coin::presenter::Field;
    use serde_json::json;

    use super::*;

    #[test]
    fn text_reply_body() {
        let reply = Reply::Text(":trash:".to_string());
        let body = serde_json::to_value(PostMessage::new("C123", None, &reply)).unwrap();

        assert_eq!(body, json!({"channel": "C123", "text": ":trash:"}));
    }

    #[test]
    fn card_reply_body_is_threaded() {
        let card = Attachment {
            fallback: "Cryptocurrency Price".into(),
            color: "#FAD898".into(),
            title: "Price of Ethereum - $ETH :beers:".into(),
            title_link: "https://coinmarketcap.com/currencies/ethereum/".into(),
            fields: vec![Field {
                title: "Price USD".into(),
                value: "$1000.00".into(),
                short: true,
            }],
            footer: "YachtBot".into(),
            ts: None,
        };
        let reply = Reply::Attachment(card);
        let body = serde_json::to_value(PostMessage::new("C123", Some("1516227262.000200"), &reply))
            .unwrap();

        assert_eq!(body["channel"], "C123");
        assert_eq!(body["thread_ts"], "1516227262.000200");
        assert!(body.get("text").is_none());
        assert_eq!(body["attachments"][0]["title"], "Price of Ethereum - $ETH :beers:");
        assert_eq!(body["attachments"][0]["fields"][0]["value"], "$1000.00");
    }

    #[test]
    fn api_error_body() {
        let res: ApiResponse =
            serde_json::from_str(r#"{"ok": false, "error": "channel_not_found"}"#).unwrap();
        assert!(!res.ok);
        assert_eq!(res.error.as_deref(), Some("channel_not_found"));
    }
}
