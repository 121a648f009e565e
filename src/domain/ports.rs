use crate::domain::model::{Destination, NormalizationRules, Record};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// 表格資料來源：依檔案順序回傳每一列
pub trait RecordSource: Send + Sync {
    fn load(&self) -> Result<Vec<Record>>;
}

/// 將渲染後的標籤文字送往目的地，回傳寫出的位元組數
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, destination: &Destination, payload: &str) -> Result<usize>;
}

pub trait ConfigProvider: Send + Sync {
    fn destination(&self) -> Destination;
    fn input_path(&self) -> &str;
    fn sheet(&self) -> Option<&str>;
    fn template_text(&self) -> Result<String>;
    fn normalization_rules(&self) -> NormalizationRules;
    fn delay(&self) -> Duration;
    fn io_timeout(&self) -> Duration;
}
