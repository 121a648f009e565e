use crate::core::dispatcher::Dispatcher;
use crate::core::engine::LabelEngine;
use crate::core::source::SpreadsheetSource;
use crate::core::template::Template;
use crate::domain::model::{Destination, NormalizationRules};
use crate::domain::ports::{ConfigProvider, Transport};
use crate::utils::error::Result;
use std::path::PathBuf;
use std::time::Duration;

/// 已解析完成的執行配置，明確地傳入引擎而非使用全域常數
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub destination: Destination,
    pub input_path: PathBuf,
    pub sheet: Option<String>,
    pub template: Template,
    pub rules: NormalizationRules,
    pub delay: Duration,
    pub io_timeout: Duration,
}

impl RunConfig {
    pub fn from_provider<C: ConfigProvider>(config: &C) -> Result<Self> {
        let template = Template::parse(&config.template_text()?)?;

        Ok(Self {
            destination: config.destination(),
            input_path: PathBuf::from(config.input_path()),
            sheet: config.sheet().map(str::to_string),
            template,
            rules: config.normalization_rules(),
            delay: config.delay(),
            io_timeout: config.io_timeout(),
        })
    }

    pub fn build_engine<T: Transport>(self, transport: T) -> LabelEngine<SpreadsheetSource, T> {
        let source = SpreadsheetSource::new(self.input_path).with_sheet(self.sheet);
        let dispatcher = Dispatcher::new(
            transport,
            self.destination,
            self.template,
            self.rules,
            self.delay,
        );
        LabelEngine::new(source, dispatcher)
    }
}
