use thiserror::Error;

/// 片段请求失败的原因
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("片段请求返回状态 {0}")]
    Status(u16),
    #[error("请求失败: {0}")]
    Transport(String),
    #[error("读取响应失败: {0}")]
    Body(String),
    #[error("请求已取消")]
    Aborted,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("解析配置失败: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("配置项 `{field}` 无效: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// 浏览器层初始化与事件处理中的错误，只记日志，不抛给用户
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("历史状态编码失败: {0}")]
    HistoryState(#[from] serde_json::Error),
    #[error("缺少浏览器对象: {0}")]
    MissingGlobal(&'static str),
    #[error("DOM 调用失败: {0}")]
    Dom(String),
}
