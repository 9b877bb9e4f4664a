//! GitHub webhook payload 解码

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use super::{Event, EventAction, EventKind};
use crate::config::Environment;

#[derive(Debug, Deserialize)]
struct User {
    login: String,
}

#[derive(Debug, Deserialize)]
struct PullRequest {
    number: Option<u64>,
    title: String,
    body: Option<String>,
    html_url: String,
    user: User,
    #[serde(default)]
    merged: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct Issue {
    number: Option<u64>,
    title: String,
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct Review {
    user: Option<User>,
    body: Option<String>,
    state: Option<String>,
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Comment {
    user: Option<User>,
    body: Option<String>,
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Repository {
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    action: Option<String>,
    pull_request: Option<PullRequest>,
    issue: Option<Issue>,
    review: Option<Review>,
    comment: Option<Comment>,
    repository: Option<Repository>,
    sender: Option<User>,
}

/// workflow 通过环境变量传入的辅助字段，优先于 payload 中的同名字段
#[derive(Debug, Clone, Default)]
pub struct AuxFields {
    pub action: Option<String>,
    pub reviewer: Option<String>,
    pub review_state: Option<String>,
    pub review_body: Option<String>,
    pub comment_author: Option<String>,
    pub comment_body: Option<String>,
}

impl AuxFields {
    pub fn from_env(env: &Environment) -> Self {
        Self {
            action: env.get_owned("EVENT_ACTION"),
            reviewer: env.get_owned("REVIEWER"),
            review_state: env.get_owned("REVIEW_STATE"),
            review_body: env.get_owned("REVIEW_BODY"),
            comment_author: env.get_owned("COMMENT_AUTHOR"),
            comment_body: env.get_owned("COMMENT_BODY"),
        }
    }
}

/// 解码 payload，缺少必要字段即失败
pub fn decode(kind: EventKind, payload: &str, aux: &AuxFields) -> Result<Event> {
    let payload: EventPayload =
        serde_json::from_str(payload).context("Event payload is not valid JSON")?;
    let repository = payload.repository.as_ref().map(|r| r.full_name.clone());

    match kind {
        EventKind::PullRequest => {
            let pr = payload
                .pull_request
                .ok_or_else(|| anyhow!("missing field `pull_request`"))?;
            let action = aux
                .action
                .clone()
                .or(payload.action)
                .ok_or_else(|| anyhow!("missing field `action`"))?;

            Ok(Event {
                kind,
                actor: pr.user.login,
                action: EventAction::parse(&action),
                title: pr.title,
                body: pr.body,
                url: pr.html_url,
                merged: pr.merged,
                number: pr.number,
                repository,
                review_state: None,
            })
        }
        EventKind::Review => {
            let pr = payload
                .pull_request
                .ok_or_else(|| anyhow!("missing field `pull_request`"))?;
            let review = payload.review;
            let actor = aux
                .reviewer
                .clone()
                .or_else(|| review.as_ref().and_then(|r| r.user.as_ref()).map(|u| u.login.clone()))
                .or_else(|| payload.sender.map(|u| u.login))
                .ok_or_else(|| anyhow!("missing reviewer"))?;
            let body = aux
                .review_body
                .clone()
                .or_else(|| review.as_ref().and_then(|r| r.body.clone()));
            let review_state = aux
                .review_state
                .clone()
                .or_else(|| review.as_ref().and_then(|r| r.state.clone()))
                .map(|s| s.to_lowercase());
            let url = review
                .and_then(|r| r.html_url)
                .unwrap_or(pr.html_url);

            Ok(Event {
                kind,
                actor,
                action: EventAction::Reviewed,
                title: pr.title,
                body,
                url,
                merged: pr.merged,
                number: pr.number,
                repository,
                review_state,
            })
        }
        EventKind::Comment => {
            // pull_request_review_comment 带 pull_request，issue_comment 带 issue
            let (title, subject_url, number) = match (payload.pull_request, payload.issue) {
                (Some(pr), _) => (pr.title, pr.html_url, pr.number),
                (None, Some(issue)) => (issue.title, issue.html_url, issue.number),
                (None, None) => return Err(anyhow!("missing field `pull_request` or `issue`")),
            };
            let comment = payload.comment;
            let actor = aux
                .comment_author
                .clone()
                .or_else(|| comment.as_ref().and_then(|c| c.user.as_ref()).map(|u| u.login.clone()))
                .or_else(|| payload.sender.map(|u| u.login))
                .ok_or_else(|| anyhow!("missing comment author"))?;
            let body = aux
                .comment_body
                .clone()
                .or_else(|| comment.as_ref().and_then(|c| c.body.clone()));
            let url = comment
                .and_then(|c| c.html_url)
                .unwrap_or(subject_url);

            Ok(Event {
                kind,
                actor,
                action: EventAction::Commented,
                title,
                body,
                url,
                merged: None,
                number,
                repository,
                review_state: None,
            })
        }
    }
}
