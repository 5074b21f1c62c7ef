use serde::{Deserialize, Serialize};

/// 缓存中的一页片段，`path` 不含锚点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub path: String,
    pub content: String,
}

/// 写进浏览器历史条目的页面状态
///
/// 字段名沿用页面脚本一直使用的 `path` / `pageYOffset`，
/// 旧版本留下的历史条目也能被读回。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryStateRecord {
    pub path: String,
    #[serde(rename = "pageYOffset", default)]
    pub scroll_offset: f64,
}

impl HistoryStateRecord {
    pub fn new(path: impl Into<String>, scroll_offset: f64) -> Self {
        Self {
            path: path.into(),
            scroll_offset,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// 请求代号：每次发起网络请求递增，异步回调带着它回来对账
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(pub u64);

/// 导航目标拆成基础路径与锚点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPath {
    pub base: String,
    pub anchor: Option<String>,
}

impl TargetPath {
    /// 在第一个 `#` 处切开；`#` 后为空视为没有锚点
    pub fn parse(path: &str) -> Self {
        match path.split_once('#') {
            Some((base, anchor)) => TargetPath {
                base: base.to_string(),
                anchor: (!anchor.is_empty()).then(|| anchor.to_string()),
            },
            None => TargetPath {
                base: path.to_string(),
                anchor: None,
            },
        }
    }
}

/// 侧栏高亮用的路径：去掉锚点和末尾斜杠（根路径 `/` 保留）
pub fn selection_key(path: &str) -> &str {
    let without_anchor = path.split_once('#').map_or(path, |(base, _)| base);
    if without_anchor.len() > 1 {
        without_anchor.strip_suffix('/').unwrap_or(without_anchor)
    } else {
        without_anchor
    }
}

/// 片段载荷：第一行是标题，其余是正文
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageFragment<'a> {
    pub title: &'a str,
    pub body: &'a str,
}

impl<'a> PageFragment<'a> {
    /// 没有换行时标题为空，整段都当正文
    pub fn parse(payload: &'a str) -> Self {
        match payload.split_once('\n') {
            Some((title, body)) => PageFragment { title, body },
            None => PageFragment {
                title: "",
                body: payload,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_path_splits_at_first_hash() {
        let target = TargetPath::parse("/docs/x#section#more");
        assert_eq!(target.base, "/docs/x");
        assert_eq!(target.anchor.as_deref(), Some("section#more"));

        let bare = TargetPath::parse("/docs/x#");
        assert_eq!(bare.base, "/docs/x");
        assert_eq!(bare.anchor, None);

        assert_eq!(TargetPath::parse("/docs/x").anchor, None);
    }

    #[test]
    fn selection_key_strips_anchor_and_trailing_slash() {
        assert_eq!(selection_key("/docs/intro/#top"), "/docs/intro");
        assert_eq!(selection_key("/docs/intro/"), "/docs/intro");
        assert_eq!(selection_key("/"), "/");
        assert_eq!(selection_key("/#top"), "/");
    }

    #[test]
    fn fragment_title_is_first_line() {
        let fragment = PageFragment::parse("Intro\n<h1>Intro</h1>\n<p>x</p>");
        assert_eq!(fragment.title, "Intro");
        assert_eq!(fragment.body, "<h1>Intro</h1>\n<p>x</p>");

        let headless = PageFragment::parse("<p>only body</p>");
        assert_eq!(headless.title, "");
        assert_eq!(headless.body, "<p>only body</p>");
    }

    #[test]
    fn history_record_uses_page_y_offset_key() {
        let record = HistoryStateRecord::new("/docs/intro#a", 120.0);
        let json = record.to_json().unwrap();
        assert!(json.contains("\"pageYOffset\":120.0"));
        assert_eq!(HistoryStateRecord::from_json(&json).unwrap(), record);

        let legacy = HistoryStateRecord::from_json(r#"{"path":"/docs/a"}"#).unwrap();
        assert_eq!(legacy.scroll_offset, 0.0);
    }
}
