use crate::core::template::Template;
use crate::domain::model::{Destination, NormalizationRules, Record};
use crate::domain::ports::Transport;
use crate::utils::error::{LabelError, Result};
use std::time::Duration;

pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub enum DispatchStatus {
    Sent { bytes: usize },
    Failed(LabelError),
}

#[derive(Debug)]
pub struct DispatchOutcome {
    /// 1-based，與日誌中的記錄編號一致
    pub index: usize,
    pub status: DispatchStatus,
}

impl DispatchOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self.status, DispatchStatus::Sent { .. })
    }

    pub fn error(&self) -> Option<&LabelError> {
        match &self.status {
            DispatchStatus::Failed(e) => Some(e),
            DispatchStatus::Sent { .. } => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct DispatchReport {
    pub outcomes: Vec<DispatchOutcome>,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn sent(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_sent()).count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.sent()
    }
}

/// 逐筆處理記錄：正規化、渲染模板、送出，每筆之間固定暫停
pub struct Dispatcher<T: Transport> {
    transport: T,
    destination: Destination,
    template: Template,
    rules: NormalizationRules,
    delay: Duration,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(
        transport: T,
        destination: Destination,
        template: Template,
        rules: NormalizationRules,
        delay: Duration,
    ) -> Self {
        Self {
            transport,
            destination,
            template,
            rules,
            delay,
        }
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub async fn run(&self, records: &[Record]) -> DispatchReport {
        let mut report = DispatchReport::default();

        for (position, record) in records.iter().enumerate() {
            let index = position + 1;
            let status = match self.dispatch_one(index, record).await {
                Ok(bytes) => DispatchStatus::Sent { bytes },
                Err(e) => {
                    log_failure(index, &e);
                    DispatchStatus::Failed(e)
                }
            };
            report.outcomes.push(DispatchOutcome { index, status });

            // 最後一筆之後沒有下一筆，不再暫停
            if index < records.len() && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        tracing::info!(
            "🏁 Label run completed: {} attempted, {} sent, {} failed",
            report.attempted(),
            report.sent(),
            report.failed()
        );
        report
    }

    async fn dispatch_one(&self, index: usize, record: &Record) -> Result<usize> {
        let fields = record.normalize(&self.rules);
        tracing::info!(
            record = index,
            row = record.row,
            "--- Processing entry #{} --- {}",
            index,
            serde_json::to_string(&fields).unwrap_or_default()
        );

        let payload = self.template.render(&fields)?;
        tracing::debug!("Rendered label #{} ({} bytes)", index, payload.len());

        let bytes = self.transport.send(&self.destination, &payload).await?;
        tracing::info!(
            "✅ Label #{} sent to {} ({} bytes)",
            index,
            self.destination,
            bytes
        );
        Ok(bytes)
    }
}

fn log_failure(index: usize, error: &LabelError) {
    match error {
        LabelError::MissingField { field } => tracing::warn!(
            record = index,
            "❌ Placeholder '{}' not found in the data of entry #{}; label skipped",
            field,
            index
        ),
        LabelError::ConnectionRefused { destination } => tracing::error!(
            record = index,
            "❌ Connection refused by {} for entry #{}",
            destination,
            index
        ),
        other => tracing::error!(
            record = index,
            "❌ Error while processing entry #{}: {}",
            index,
            other
        ),
    }
}
