//! 目录列表页（目录下没有 index.html 时使用）

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// 路径段中需要转义的字符
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/');

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
}

/// 将请求路径解码为相对路径；包含 `..` 时返回 None
pub fn request_path(path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(path).decode_utf8().ok()?;
    let mut relative = PathBuf::new();

    for segment in decoded.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        if segment == ".." || segment.contains('\\') {
            return None;
        }
        relative.push(segment);
    }

    // 防止 Windows 盘符等绝对路径
    if relative.components().any(|c| !matches!(c, Component::Normal(_))) {
        return None;
    }
    Some(relative)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// 渲染列表 HTML，目录名以 `/` 结尾
pub fn render_listing(display_path: &str, entries: &[ListingEntry]) -> String {
    let title = format!("Directory listing for {}", escape_html(display_path));
    let mut html = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{0}</title>\n</head>\n<body>\n<h1>{0}</h1>\n<hr>\n<ul>\n",
        title
    );

    for entry in entries {
        let suffix = if entry.is_dir { "/" } else { "" };
        html.push_str(&format!(
            "<li><a href=\"{}{}\">{}{}</a></li>\n",
            utf8_percent_encode(&entry.name, SEGMENT),
            suffix,
            escape_html(&entry.name),
            suffix
        ));
    }

    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    html
}

async fn read_entries(dir: &Path) -> std::io::Result<Vec<ListingEntry>> {
    let mut reader = tokio::fs::read_dir(dir).await?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        let is_dir = entry
            .file_type()
            .await
            .map(|t| t.is_dir())
            .unwrap_or(false);
        entries.push(ListingEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
        });
    }

    entries.sort_by_key(|e| e.name.to_lowercase());
    Ok(entries)
}

/// `ServeDir` 找不到文件时的回退处理
pub async fn directory_listing(State(root): State<Arc<PathBuf>>, uri: Uri) -> Response {
    let Some(relative) = request_path(uri.path()) else {
        return (StatusCode::BAD_REQUEST, "Bad request").into_response();
    };

    let dir = root.join(&relative);
    if !dir.is_dir() {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }

    match read_entries(&dir).await {
        Ok(entries) => {
            let display = percent_decode_str(uri.path()).decode_utf8_lossy();
            Html(render_listing(&display, &entries)).into_response()
        }
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "Failed to list directory");
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
    }
}
