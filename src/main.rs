//! revtrans 命令行入口
//!
//! 用法：
//!   revtrans [--input-format plain|encrypted] [--password <pw>] [--output <file>] <input>
//!
//! 设计原则：
//! - 口令优先取参数，其次取 `REVTRANS_PASSWORD`，最后在终端交互输入
//! - 日志与提示写到 stderr，stdout 只输出 CSV
//! - 所有实际逻辑都委托给库

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::exit;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use tracing::info;
use zeroize::Zeroizing;

use revtrans::{EntryList, EntryWriter, SecretsCsv};

/// 提供口令的环境变量
const PASSWORD_ENV_VAR: &str = "REVTRANS_PASSWORD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    Plain,
    Encrypted,
}

#[derive(Debug, Parser)]
#[command(name = "revtrans", version, about = "Revelation Password File Transformer")]
struct Cli {
    /// 输入格式
    #[arg(long, value_enum, default_value_t = InputFormat::Encrypted)]
    input_format: InputFormat,

    /// 解密口令；不建议在命令行上直接提供
    #[arg(long)]
    password: Option<String>,

    /// 输出文件，默认写到 stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Revelation 文件
    input: PathBuf,
}

fn main() {
    init_tracing();

    let cli = Cli::parse();

    eprintln!("RevTrans - Revelation Password File Transformer\n");

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        exit(3);
    }
}

fn run(cli: Cli) -> Result<()> {
    let entries = load_entries(&cli)?;
    info!(entries = entries.len(), "loaded revelation entries");

    let writer = SecretsCsv::new();
    match &cli.output {
        Some(path) => writer
            .save(&entries, path)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            writer.write_to(&entries, &mut out)?;
            out.flush()?;
        }
    }

    Ok(())
}

fn load_entries(cli: &Cli) -> Result<EntryList> {
    let entries = match cli.input_format {
        InputFormat::Plain => revtrans::read_plain(&cli.input),
        InputFormat::Encrypted => {
            let password = resolve_password(cli.password.as_deref())?;
            revtrans::decrypt_vault(&cli.input, password.as_bytes())
        }
    };

    entries.with_context(|| format!("failed to read {}", cli.input.display()))
}

fn resolve_password(flag: Option<&str>) -> Result<Zeroizing<String>> {
    if let Some(password) = flag.filter(|p| !p.is_empty()) {
        return Ok(Zeroizing::new(password.to_string()));
    }

    if let Ok(password) = std::env::var(PASSWORD_ENV_VAR)
        && !password.is_empty()
    {
        return Ok(Zeroizing::new(password));
    }

    if io::stdin().is_terminal() {
        let password = rpassword::prompt_password("Password: ")
            .context("failed to read password")?;
        return Ok(Zeroizing::new(password));
    }

    bail!("no password provided. Use --password, set {PASSWORD_ENV_VAR} or run interactively")
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("revtrans=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}
