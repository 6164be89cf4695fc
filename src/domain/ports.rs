use crate::domain::model::{LookupOutcome, Query};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// 所有運行參數都經由這個介面注入，核心邏輯不依賴任何硬編碼常數
pub trait ConfigProvider: Send + Sync {
    fn host(&self) -> &str;
    fn port(&self) -> u16;
    fn upstream_url(&self) -> &str;
    fn max_retries(&self) -> u32;
    fn retry_delay(&self) -> Duration;
    fn request_timeout(&self) -> Duration;

    /// 附加的上游請求標頭（預設無）
    fn upstream_headers(&self) -> Option<&HashMap<String, String>> {
        None
    }
}

#[async_trait]
pub trait NumberLookup: Send + Sync {
    async fn lookup(&self, query: &Query) -> LookupOutcome;
}
