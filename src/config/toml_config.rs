use crate::core::dispatcher::DEFAULT_DELAY;
use crate::core::source::SUPPORTED_EXTENSIONS;
use crate::core::template::Template;
use crate::core::transport::DEFAULT_IO_TIMEOUT;
use crate::domain::model::{
    Destination, NormalizationRules, DEFAULT_DATE_COLUMN, DEFAULT_DATE_UNAVAILABLE,
};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{LabelError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 9100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub printer: PrinterConfig,
    pub source: SourceConfig,
    pub template: TemplateConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    /// 配置檔所在目錄，用來解析相對的模板路徑
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrinterConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub path: String,
    pub sheet: Option<String>,
    pub date_column: Option<String>,
    pub date_unavailable: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateConfig {
    pub text: Option<String>,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchConfig {
    pub delay_ms: Option<u64>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LabelError::IoError)?;
        let mut config = Self::from_toml_str(&content)?;
        config.base_dir = path.as_ref().parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LabelError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PRINTER_HOST})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LabelError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    fn template_path(&self, file: &str) -> PathBuf {
        let path = Path::new(file);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("printer.host", &self.printer.host)?;
        validation::validate_port("printer.port", self.printer.port)?;

        validation::validate_path("source.path", &self.source.path)?;
        validation::validate_file_extension("source.path", &self.source.path, SUPPORTED_EXTENSIONS)?;

        if let Some(column) = &self.source.date_column {
            validation::validate_non_empty_string("source.date_column", column)?;
        }

        match (&self.template.text, &self.template.file) {
            (Some(_), Some(_)) => {
                return Err(LabelError::ConfigValidationError {
                    field: "template".to_string(),
                    message: "set either 'text' or 'file', not both".to_string(),
                })
            }
            (None, Some(file)) => validation::validate_path("template.file", file)?,
            _ => {}
        }

        Template::parse(&self.template_text()?)?;
        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn destination(&self) -> Destination {
        Destination::new(self.printer.host.clone(), self.printer.port)
    }

    fn input_path(&self) -> &str {
        &self.source.path
    }

    fn sheet(&self) -> Option<&str> {
        self.source.sheet.as_deref()
    }

    fn template_text(&self) -> Result<String> {
        if let Some(file) = &self.template.file {
            let path = self.template_path(file);
            return std::fs::read_to_string(&path).map_err(|e| {
                LabelError::ConfigValidationError {
                    field: "template.file".to_string(),
                    message: format!("cannot read '{}': {}", path.display(), e),
                }
            });
        }

        validation::validate_required_field("template.text", &self.template.text).cloned()
    }

    fn normalization_rules(&self) -> NormalizationRules {
        NormalizationRules {
            date_column: self
                .source
                .date_column
                .clone()
                .unwrap_or_else(|| DEFAULT_DATE_COLUMN.to_string()),
            date_unavailable: self
                .source
                .date_unavailable
                .clone()
                .unwrap_or_else(|| DEFAULT_DATE_UNAVAILABLE.to_string()),
        }
    }

    fn delay(&self) -> Duration {
        self.dispatch
            .delay_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_DELAY)
    }

    fn io_timeout(&self) -> Duration {
        self.printer
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_IO_TIMEOUT)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
