use clap::Parser;
use label_relay::domain::ports::Transport;
use label_relay::utils::{logger, validation::Validate};
use label_relay::{
    CliConfig, DispatchReport, DryRunTransport, LabelError, RunConfig, TcpTransport, TomlConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliConfig::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting label-relay");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    args.apply_overrides(&mut config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let run_config = match RunConfig::from_provider(&config) {
        Ok(run_config) => run_config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    display_config_summary(&run_config, &args);

    let result = if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - labels are written to stdout");
        execute(run_config, DryRunTransport).await
    } else {
        let transport = TcpTransport::new(run_config.io_timeout);
        execute(run_config, transport).await
    };

    match result {
        Ok(report) => {
            println!(
                "✅ Label printing completed: {} sent, {} failed",
                report.sent(),
                report.failed()
            );
        }
        Err(e) => {
            tracing::error!(
                "❌ Label run aborted: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = e.exit_code();

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

async fn execute<T: Transport>(
    run_config: RunConfig,
    transport: T,
) -> Result<DispatchReport, LabelError> {
    run_config.build_engine(transport).run().await
}

fn display_config_summary(config: &RunConfig, args: &CliConfig) {
    println!("📋 Configuration Summary:");
    println!("  Printer: {}", config.destination);
    println!("  Input: {}", config.input_path.display());
    if let Some(sheet) = &config.sheet {
        println!("  Sheet: {}", sheet);
    }
    println!("  Placeholders: {}", config.template.placeholders().join(", "));
    println!("  Date column: {}", config.rules.date_column);
    println!("  Delay: {:?}", config.delay);

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}
