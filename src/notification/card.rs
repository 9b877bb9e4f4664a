//! 飞书互动卡片
//!
//! 卡片结构固定：头部（标题 + 颜色）、一段 lark_md 正文、一个跳转按钮。

use serde::Serialize;

use super::status::{self, msg};
use crate::config::CreatorName;
use crate::event::Event;

/// 正文最大字符数
pub const MAX_BODY_CHARS: usize = 1000;

const NO_DESCRIPTION: &str = "_No description provided._";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TextTag {
    PlainText,
    LarkMd,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Text {
    pub tag: TextTag,
    pub content: String,
}

impl Text {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            tag: TextTag::PlainText,
            content: content.into(),
        }
    }

    pub fn markdown(content: impl Into<String>) -> Self {
        Self {
            tag: TextTag::LarkMd,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CardConfig {
    pub wide_screen_mode: bool,
    pub enable_forward: bool,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            wide_screen_mode: true,
            enable_forward: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CardHeader {
    pub title: Text,
    pub template: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum ActionItem {
    Button {
        text: Text,
        url: String,
        #[serde(rename = "type")]
        kind: String,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum CardElement {
    Div { text: Text },
    Action { actions: Vec<ActionItem> },
}

/// 互动卡片
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Card {
    pub config: CardConfig,
    pub header: CardHeader,
    pub elements: Vec<CardElement>,
}

impl Card {
    /// 正文 markdown
    pub fn body_markdown(&self) -> Option<&str> {
        self.elements.iter().find_map(|e| match e {
            CardElement::Div { text } => Some(text.content.as_str()),
            _ => None,
        })
    }

    /// 按钮跳转地址
    pub fn button_url(&self) -> Option<&str> {
        self.elements.iter().find_map(|e| match e {
            CardElement::Action { actions } => actions.iter().find_map(|a| match a {
                ActionItem::Button { url, .. } => Some(url.as_str()),
            }),
            _ => None,
        })
    }
}

/// 按字符截断，超出部分以省略号结尾
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push('…');
    truncated
}

/// 构建卡片（纯函数）
pub fn build_card(event: &Event, creator: &CreatorName) -> Card {
    let status = status::status_of(event);

    let mut lines = vec![
        format!("**Creator:** {}", creator.to_markdown()),
        format!("**Status:** {}", status.label),
    ];
    if let Some(repo) = &event.repository {
        match event.number {
            Some(n) => lines.push(format!("**Repository:** {} #{}", repo, n)),
            None => lines.push(format!("**Repository:** {}", repo)),
        }
    }
    if let Some(state) = &event.review_state {
        lines.push(format!("**Review:** {}", state));
    }

    let body = event
        .body
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(|b| truncate_chars(b, MAX_BODY_CHARS))
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

    let content = format!("{}\n\n{}", lines.join("\n"), body);

    Card {
        config: CardConfig::default(),
        header: CardHeader {
            title: Text::plain(format!("[{}] {}", status.label, event.title)),
            template: status.template.as_str().to_string(),
        },
        elements: vec![
            CardElement::Div {
                text: Text::markdown(content),
            },
            CardElement::Action {
                actions: vec![ActionItem::Button {
                    text: Text::plain(msg::VIEW_BUTTON),
                    url: event.url.clone(),
                    kind: "primary".to_string(),
                }],
            },
        ],
    }
}
