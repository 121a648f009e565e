use anyhow::Result;
use label_relay::domain::ports::ConfigProvider;
use label_relay::{LabelError, RunConfig, TcpTransport, TomlConfig};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// 假印表機：依序接受 `expected` 個連線並收集每個連線的完整內容
async fn fake_printer(expected: usize) -> Result<(u16, JoinHandle<Vec<String>>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();

    let handle = tokio::spawn(async move {
        let mut payloads = Vec::new();
        for _ in 0..expected {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            socket.read_to_end(&mut buf).await.unwrap();
            payloads.push(String::from_utf8(buf).unwrap());
        }
        payloads
    });

    Ok((port, handle))
}

fn config_for(input: &Path, port: u16, template: &str, delay_ms: u64) -> Result<TomlConfig> {
    let content = format!(
        r#"
[printer]
host = "127.0.0.1"
port = {port}
timeout_ms = 2000

[source]
path = "{input}"

[template]
text = """{template}"""

[dispatch]
delay_ms = {delay_ms}
"#,
        port = port,
        input = input.display().to_string().replace('\\', "/"),
        template = template,
        delay_ms = delay_ms,
    );
    Ok(TomlConfig::from_toml_str(&content)?)
}

#[tokio::test]
async fn test_three_rows_produce_three_payloads_in_order() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("etiquetas.csv");
    std::fs::write(
        &input,
        "Lote,Paquete,Fecha\nL-001,1,2025-01-10\nL-002,2,2025-01-11\nL-003,3,2025-01-12\n",
    )?;

    let (port, printer) = fake_printer(3).await?;
    let config = config_for(
        &input,
        port,
        "^XA^FD{Lote}^FS^FD{Fecha}^FS^BCN^FD{Lote}-{Paquete}^FS^XZ",
        50,
    )?;
    let run_config = RunConfig::from_provider(&config)?;
    let transport = TcpTransport::new(config.io_timeout());

    let started = Instant::now();
    let report = run_config.build_engine(transport).run().await?;
    let elapsed = started.elapsed();

    assert_eq!(report.attempted(), 3);
    assert_eq!(report.sent(), 3);
    assert!(elapsed >= Duration::from_millis(100));

    let payloads = printer.await?;
    assert_eq!(
        payloads,
        vec![
            "^XA^FDL-001^FS^FD10/01/2025^FS^BCN^FDL-001-1^FS^XZ",
            "^XA^FDL-002^FS^FD11/01/2025^FS^BCN^FDL-002-2^FS^XZ",
            "^XA^FDL-003^FS^FD12/01/2025^FS^BCN^FDL-003-3^FS^XZ",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_xlsx_rows_with_missing_column_are_skipped() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("etiquetas.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let date_format = Format::new().set_num_format("dd/mm/yyyy");
    sheet.write_string(0, 0, "Lote")?;
    sheet.write_string(0, 1, "Paquete")?;
    sheet.write_string(0, 2, "Fecha")?;
    for (row, lote) in ["A7", "A8"].iter().enumerate() {
        let row = row as u32 + 1;
        sheet.write_string(row, 0, *lote)?;
        sheet.write_number(row, 1, row as f64 * 10.0)?;
        let date = ExcelDateTime::from_ymd(2024, 2, row as u8)?;
        sheet.write_datetime_with_format(row, 2, &date, &date_format)?;
    }
    workbook.save(&input)?;

    // {Variante} no existe en la hoja: ninguna etiqueta se envía
    let (port, _printer) = fake_printer(0).await?;
    let config = config_for(&input, port, "{Lote} {Variante}", 0)?;
    let report = RunConfig::from_provider(&config)?
        .build_engine(TcpTransport::new(config.io_timeout()))
        .run()
        .await?;
    assert_eq!(report.attempted(), 2);
    assert_eq!(report.sent(), 0);
    assert!(report
        .outcomes
        .iter()
        .all(|o| matches!(o.error(), Some(LabelError::MissingField { field }) if field == "Variante")));

    let (port, printer) = fake_printer(2).await?;
    let config = config_for(&input, port, "{Lote}|{Paquete}|{Fecha}", 0)?;
    let report = RunConfig::from_provider(&config)?
        .build_engine(TcpTransport::new(config.io_timeout()))
        .run()
        .await?;
    assert_eq!(report.sent(), 2);
    assert_eq!(
        printer.await?,
        vec!["A7|10|01/02/2024", "A8|20|02/02/2024"]
    );
    Ok(())
}

#[tokio::test]
async fn test_refused_printer_completes_run() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("etiquetas.csv");
    std::fs::write(&input, "Lote,Paquete\nL1,1\nL2,2\n")?;

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    drop(listener);

    let config = config_for(&input, port, "{Lote}-{Paquete}", 0)?;
    let report = RunConfig::from_provider(&config)?
        .build_engine(TcpTransport::new(config.io_timeout()))
        .run()
        .await?;

    assert_eq!(report.attempted(), 2);
    assert_eq!(report.sent(), 0);
    assert!(report
        .outcomes
        .iter()
        .all(|o| matches!(o.error(), Some(LabelError::ConnectionRefused { .. }))));
    Ok(())
}

/// 收集 tracing 輸出的 writer
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_refused_run_logs_each_failure_and_completion() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("etiquetas.csv");
    std::fs::write(&input, "Lote,Paquete\nL1,1\nL2,2\n")?;

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    drop(listener);

    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let config = config_for(&input, port, "{Lote}-{Paquete}", 0)?;
    let report = RunConfig::from_provider(&config)?
        .build_engine(TcpTransport::new(config.io_timeout()))
        .run()
        .await?;
    assert_eq!(report.failed(), 2);

    let output = logs.contents();
    assert!(output.contains("Connection refused by"));
    assert!(output.contains("entry #1"));
    assert!(output.contains("entry #2"));
    assert!(output.contains("🏁 Label run completed: 2 attempted, 0 sent, 2 failed"));
    Ok(())
}

#[tokio::test]
async fn test_missing_source_aborts_before_dispatch() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("no-such-file.xlsx");

    let (port, _printer) = fake_printer(0).await?;
    let config = config_for(&input, port, "{Lote}", 0)?;
    let result = RunConfig::from_provider(&config)?
        .build_engine(TcpTransport::new(config.io_timeout()))
        .run()
        .await;

    assert!(matches!(result, Err(LabelError::SourceNotFound { .. })));
    Ok(())
}

#[test]
fn test_bundled_config_and_template_are_valid() -> Result<()> {
    use label_relay::utils::validation::Validate;

    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("label-config.toml");
    let config = TomlConfig::from_file(&path)?;
    config.validate()?;

    let run_config = RunConfig::from_provider(&config)?;
    assert_eq!(run_config.destination.port, 9100);
    assert_eq!(run_config.delay, Duration::from_secs(1));
    assert_eq!(
        run_config.template.placeholders(),
        vec![
            "DescProducto",
            "DescProveedor",
            "Lote",
            "Paquete",
            "Fecha",
            "Variante",
            "Agricultor",
            "Origen"
        ]
    );
    Ok(())
}
