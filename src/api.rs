use gloo_net::http::Request;
use web_sys::AbortSignal;

use crate::error::FetchError;

/// 获取页面片段（`<路径>.ajax`），非成功状态一律视为失败
pub async fn fetch_fragment(url: &str, signal: &AbortSignal) -> Result<String, FetchError> {
    let resp = match Request::get(url).abort_signal(Some(signal)).send().await {
        Ok(resp) => resp,
        Err(_) if signal.aborted() => return Err(FetchError::Aborted),
        Err(e) => return Err(FetchError::Transport(e.to_string())),
    };
    if !resp.ok() {
        return Err(FetchError::Status(resp.status()));
    }
    match resp.text().await {
        Ok(text) => Ok(text),
        Err(_) if signal.aborted() => Err(FetchError::Aborted),
        Err(e) => Err(FetchError::Body(e.to_string())),
    }
}
