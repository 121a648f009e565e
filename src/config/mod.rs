pub mod run_config;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "label-relay")]
#[command(about = "Print one label per spreadsheet row on a network label printer")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "label-config.toml")]
    pub config: String,

    /// Override printer host from config
    #[arg(long)]
    pub host: Option<String>,

    /// Override printer port from config
    #[arg(long)]
    pub port: Option<u16>,

    /// Override the spreadsheet path from config
    #[arg(short, long)]
    pub input: Option<String>,

    /// Worksheet to read (defaults to the first one)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Override the pause between labels, in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Render labels to stdout without contacting the printer
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 套用命令列覆蓋設定
    pub fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(host) = &self.host {
            config.printer.host = host.clone();
        }
        if let Some(port) = self.port {
            config.printer.port = port;
        }
        if let Some(input) = &self.input {
            config.source.path = input.clone();
        }
        if let Some(sheet) = &self.sheet {
            config.source.sheet = Some(sheet.clone());
        }
        if let Some(delay_ms) = self.delay_ms {
            config.dispatch.delay_ms = Some(delay_ms);
        }
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let mut config = TomlConfig::from_toml_str(
            r#"
[printer]
host = "172.16.1.203"

[source]
path = "etiquetas.xlsx"

[template]
text = "{Lote}"
"#,
        )
        .unwrap();

        let cli = CliConfig::parse_from([
            "label-relay",
            "--host",
            "127.0.0.1",
            "--port",
            "9200",
            "--input",
            "otras.csv",
            "--delay-ms",
            "0",
        ]);
        cli.apply_overrides(&mut config);

        assert_eq!(config.printer.host, "127.0.0.1");
        assert_eq!(config.printer.port, 9200);
        assert_eq!(config.source.path, "otras.csv");
        assert_eq!(config.dispatch.delay_ms, Some(0));
        assert_eq!(cli.config, "label-config.toml");
    }
}
