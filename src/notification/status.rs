//! 状态标签查找表

use crate::event::{Event, EventAction};

/// Status labels shown on the card
pub mod msg {
    pub const NEW_PR: &str = "new PR";
    pub const UPDATED_PR: &str = "updated PR";
    pub const MERGED_PR: &str = "merged PR";
    pub const CLOSED_PR: &str = "closed PR";
    pub const REVIEWED_PR: &str = "PR reviewed";
    pub const NEW_COMMENT: &str = "new comment";
    pub const UNKNOWN: &str = "unknown status";

    /// 按钮文字
    pub const VIEW_BUTTON: &str = "View on GitHub";
}

/// 卡片头部颜色模板
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderTemplate {
    Blue,
    Wathet,
    Green,
    Red,
    Turquoise,
    Yellow,
    Grey,
}

impl HeaderTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderTemplate::Blue => "blue",
            HeaderTemplate::Wathet => "wathet",
            HeaderTemplate::Green => "green",
            HeaderTemplate::Red => "red",
            HeaderTemplate::Turquoise => "turquoise",
            HeaderTemplate::Yellow => "yellow",
            HeaderTemplate::Grey => "grey",
        }
    }
}

/// 事件状态：标签 + 头部颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub label: &'static str,
    pub template: HeaderTemplate,
}

/// 固定查找表；`closed` 需要区分是否已合并
pub fn lookup(action: &EventAction, merged: bool) -> Status {
    let (label, template) = match action {
        EventAction::Opened => (msg::NEW_PR, HeaderTemplate::Blue),
        EventAction::Synchronize => (msg::UPDATED_PR, HeaderTemplate::Wathet),
        EventAction::Closed if merged => (msg::MERGED_PR, HeaderTemplate::Green),
        EventAction::Closed => (msg::CLOSED_PR, HeaderTemplate::Red),
        EventAction::Reviewed => (msg::REVIEWED_PR, HeaderTemplate::Turquoise),
        EventAction::Commented => (msg::NEW_COMMENT, HeaderTemplate::Yellow),
        EventAction::Other(_) => (msg::UNKNOWN, HeaderTemplate::Grey),
    };
    Status { label, template }
}

pub fn status_of(event: &Event) -> Status {
    lookup(&event.action, event.is_merged())
}
