use crate::core::dispatcher::{DispatchReport, Dispatcher};
use crate::domain::ports::{RecordSource, Transport};
use crate::utils::error::Result;

pub struct LabelEngine<S: RecordSource, T: Transport> {
    source: S,
    dispatcher: Dispatcher<T>,
}

impl<S: RecordSource, T: Transport> LabelEngine<S, T> {
    pub fn new(source: S, dispatcher: Dispatcher<T>) -> Self {
        Self { source, dispatcher }
    }

    /// 載入失敗會中止整批；單筆錯誤只反映在報告中
    pub async fn run(&self) -> Result<DispatchReport> {
        tracing::info!("📥 Loading records...");
        let records = self.source.load()?;
        tracing::info!("Found {} entries in the source file", records.len());

        tracing::info!(
            "🖨️ Dispatching {} labels to {}",
            records.len(),
            self.dispatcher.destination()
        );
        Ok(self.dispatcher.run(&records).await)
    }
}
