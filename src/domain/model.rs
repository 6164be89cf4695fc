use crate::utils::error::Result;
use crate::utils::validation::validate_query_number;
use serde::{Deserialize, Serialize};

/// 經過驗證的查詢號碼（剛好 10 位數字）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    pub fn parse(raw: &str) -> Result<Self> {
        validate_query_number("num", raw)?;
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 上游回傳的單筆記錄，欄位皆為可選
pub type RawRecord = serde_json::Value;

/// 固定 8 個欄位的正規化記錄
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub mobile: String,
    pub name: String,
    pub fname: String,
    pub address: String,
    pub alt: String,
    pub circle: String,
    pub id: String,
    pub email: String,
}

impl NormalizedRecord {
    /// 將上游的原始記錄整理成固定欄位，缺漏的欄位補上預設值。
    /// `mobile` 缺漏時補回查詢號碼，其他欄位補空字串；非字串值視同缺漏。
    pub fn from_raw(raw: &RawRecord, query: &Query) -> Self {
        let mobile = raw
            .get("mobile")
            .and_then(|v| v.as_str())
            .unwrap_or(query.as_str())
            .to_string();
        let name = raw
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let fname = raw
            .get("fname")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let address = raw
            .get("address")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let alt = raw
            .get("alt")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let circle = raw
            .get("circle")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let id = raw
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let email = raw
            .get("email")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        Self {
            mobile,
            name,
            fname,
            address,
            alt,
            circle,
            id,
            email,
        }
    }
}

/// 回傳給呼叫端的 JSON 包裝
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub status: bool,
    pub results: Vec<NormalizedRecord>,
}

impl Envelope {
    pub fn success(results: Vec<NormalizedRecord>) -> Self {
        Self {
            status: true,
            results,
        }
    }

    pub fn failure() -> Self {
        Self {
            status: false,
            results: Vec::new(),
        }
    }
}

/// 一次完整查詢（含重試）的最終結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(Vec<NormalizedRecord>),
    Exhausted,
}
