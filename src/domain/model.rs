use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

pub const DEFAULT_DATE_COLUMN: &str = "Fecha";
pub const DEFAULT_DATE_UNAVAILABLE: &str = "Fecha no disponible";
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// 單一儲存格的值
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Empty,
}

impl FieldValue {
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", *f as i64)
            }
            Self::Float(f) => f.to_string(),
            Self::Bool(true) => "True".to_string(),
            Self::Bool(false) => "False".to_string(),
            Self::DateTime(dt) => dt.format(DATE_FORMAT).to_string(),
            Self::Empty => String::new(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// 一列資料；`row` 為資料列索引（不含標題列，從 0 開始）
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub row: usize,
    pub data: HashMap<String, FieldValue>,
}

impl Record {
    pub fn new(row: usize) -> Self {
        Self {
            row,
            data: HashMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.data.insert(name.into(), value);
        self
    }

    /// 將所有欄位轉為文字；日期欄位另外格式化為 DD/MM/YYYY
    pub fn normalize(&self, rules: &NormalizationRules) -> FieldMap {
        let mut fields: FieldMap = self
            .data
            .iter()
            .map(|(name, value)| (name.clone(), value.to_text()))
            .collect();

        let date_text = match self.data.get(&rules.date_column) {
            Some(FieldValue::DateTime(dt)) => dt.format(DATE_FORMAT).to_string(),
            Some(FieldValue::Text(text)) => match parse_iso_date(text) {
                Some(date) => date.format(DATE_FORMAT).to_string(),
                None => text.clone(),
            },
            _ => rules.date_unavailable.clone(),
        };
        fields.insert(rules.date_column.clone(), date_text);

        fields
    }
}

fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

/// 正規化後的欄位文字，依欄位名稱排序
pub type FieldMap = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizationRules {
    pub date_column: String,
    pub date_unavailable: String,
}

impl Default for NormalizationRules {
    fn default() -> Self {
        Self {
            date_column: DEFAULT_DATE_COLUMN.to_string(),
            date_unavailable: DEFAULT_DATE_UNAVAILABLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub host: String,
    pub port: u16,
}

impl Destination {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
