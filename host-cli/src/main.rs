//! # Qude 命令行宿主
//!
//! 用内存宿主运行或检查 `.q` 脚本，控制台输出写到终端。
//!
//! ```text
//! qude run demo.q --answer alice --type name=alice --click submit --right-click submit
//! qude check demo.q
//! qude init-config
//! ```
//!
//! 退出码：0 成功，2 无法读取脚本，3 解析失败，4 运行失败（生命周期检查或静态检查错误）。

mod config;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser as ClapParser, Subcommand};
use tracing::{debug, info, warn};

use config::{CliConfig, DEFAULT_CONFIG_PATH, parse_level};
use qude_runtime::{
    MemoryHost, MouseButton, Parser, Program, QudeRuntime, RuntimeInput, Severity,
    WidgetHandle, analyze_program,
};

#[derive(ClapParser, Debug)]
#[command(name = "qude", version, about = "运行和检查 Qude 脚本")]
struct Cli {
    /// 配置文件路径（默认 ./qude.json）
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// 日志级别，覆盖配置文件
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 运行脚本
    Run(RunArgs),
    /// 解析并静态检查脚本，不执行
    Check {
        /// 脚本文件
        script: PathBuf,
    },
    /// 写出一份默认配置文件
    InitConfig {
        /// 目标路径（默认 ./qude.json）
        path: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// 脚本文件
    script: PathBuf,

    /// 预置回答用完后从标准输入读取 Input 的回答
    #[arg(long)]
    interactive: bool,

    /// 预置的 Input 回答（按顺序使用）
    #[arg(long = "answer", value_name = "TEXT")]
    answers: Vec<String>,

    /// 运行结束后模拟在输入框中输入，先于 --click 执行
    #[arg(long = "type", value_name = "NAME=TEXT")]
    typed: Vec<String>,

    /// 运行结束后模拟左键点击控件或 warn 选项
    #[arg(long = "click", value_name = "NAME")]
    clicks: Vec<String>,

    /// 运行结束后模拟右键点击控件或 warn 选项，在 --click 之后执行
    #[arg(long = "right-click", value_name = "NAME")]
    right_clicks: Vec<String>,
}

/// 进程结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    Unreadable,
    ParseFailure,
    RuntimeFailure,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        let code = match outcome {
            Outcome::Success => 0,
            Outcome::Unreadable => 2,
            Outcome::ParseFailure => 3,
            Outcome::RuntimeFailure => 4,
        };
        ExitCode::from(code)
    }
}

fn main() -> ExitCode {
    match real_main() {
        Ok(outcome) => outcome.into(),
        Err(e) => {
            eprintln!("qude: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn real_main() -> anyhow::Result<Outcome> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let loaded = CliConfig::load(&config_path);
    let config = loaded.as_ref().cloned().unwrap_or_default();

    let level_name = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let Some(level) = parse_level(level_name) else {
        anyhow::bail!("未知的日志级别: {level_name}");
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = &loaded {
        warn!(path = %config_path.display(), error = %e, "配置加载失败，使用默认配置");
    }

    match cli.command {
        Command::Run(args) => run_script(&args, &config),
        Command::Check { script } => Ok(check_script(&script)),
        Command::InitConfig { path } => {
            let path = path.unwrap_or(config_path);
            init_config(&path)?;
            Ok(Outcome::Success)
        }
    }
}

/// 写出默认配置，不覆盖已有文件
fn init_config(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        anyhow::bail!("{} 已存在", path.display());
    }
    CliConfig::default()
        .save(path)
        .with_context(|| format!("无法写入 {}", path.display()))?;
    info!(path = %path.display(), "已写出默认配置");
    Ok(())
}

/// 读取脚本文本
fn read_script(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("无法读取脚本 {}", path.display()))
}

/// 读取并解析脚本，失败时已输出错误
fn load_program(path: &Path) -> Result<Program, Outcome> {
    let text = read_script(path).map_err(|e| {
        eprintln!("{e:#}");
        Outcome::Unreadable
    })?;
    let script_id = path.display().to_string();
    Parser::new().parse(&script_id, &text).map_err(|e| {
        eprintln!("{script_id}: {e}");
        Outcome::ParseFailure
    })
}

fn run_script(args: &RunArgs, config: &CliConfig) -> anyhow::Result<Outcome> {
    let typed = args
        .typed
        .iter()
        .map(|pair| parse_typed(pair))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let program = match load_program(&args.script) {
        Ok(program) => program,
        Err(outcome) => return Ok(outcome),
    };

    let mut host = build_host(args, config);
    let mut runtime = QudeRuntime::with_style(program, config.style_defaults());

    let summary = match runtime.run(&mut host) {
        Ok(summary) => summary,
        Err(e) => {
            debug!(error = %e, "运行被拒绝");
            return Ok(Outcome::RuntimeFailure);
        }
    };
    info!(
        executed = summary.executed,
        skipped = summary.skipped,
        failed = summary.failed,
        "脚本运行完成"
    );

    simulate(args, &typed, &mut runtime, &mut host);
    Ok(Outcome::Success)
}

/// 按 --type、--click、--right-click 的顺序模拟交互
fn simulate(
    args: &RunArgs,
    typed: &[(&str, &str)],
    runtime: &mut QudeRuntime,
    host: &mut MemoryHost,
) {
    for &(name, text) in typed {
        let Some(widget) = runtime.widget(name) else {
            warn!(widget = name, "--type 指向未知控件");
            continue;
        };
        let inputs = host.type_text(widget, text);
        deliver(runtime, host, inputs);
    }

    let clicks = args
        .clicks
        .iter()
        .map(|name| (name, MouseButton::Left))
        .chain(args.right_clicks.iter().map(|name| (name, MouseButton::Right)));
    for (name, button) in clicks {
        let Some(widget) = clickable(runtime, name) else {
            warn!(widget = %name, ?button, "点击指向未知控件");
            continue;
        };
        let inputs = host.click(widget, button);
        deliver(runtime, host, inputs);
    }
}

/// 按名字查找控件，找不到时查 warn 选项标签
fn clickable(runtime: &QudeRuntime, name: &str) -> Option<WidgetHandle> {
    runtime.widget(name).or_else(|| runtime.warn_option(name))
}

fn deliver(runtime: &mut QudeRuntime, host: &mut MemoryHost, inputs: Vec<RuntimeInput>) {
    for input in inputs {
        let outcome = runtime.dispatch(input, host);
        debug!(?outcome, "事件处理完成");
    }
}

/// 构造内存宿主：预置回答、交互式提示和控制台输出
fn build_host(args: &RunArgs, config: &CliConfig) -> MemoryHost {
    let mut host =
        MemoryHost::with_defaults(config.host_defaults()).with_answers(args.answers.clone());

    let console = config.console.clone();
    host.set_console_echo(move |line| {
        let text = console.format(&line.text, line.severity);
        match line.severity {
            Severity::Info => println!("{text}"),
            Severity::Warning | Severity::Error => eprintln!("{text}"),
        }
    });

    if args.interactive {
        host.set_prompter(prompt_stdin);
    }
    host
}

/// 在终端提示并读取一行；EOF 视为取消
fn prompt_stdin(message: &str) -> Option<String> {
    print!("{message} ");
    if let Err(e) = io::stdout().flush() {
        debug!(error = %e, "刷新标准输出失败");
    }
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
    }
}

/// 解析 `NAME=TEXT`
fn parse_typed(pair: &str) -> anyhow::Result<(&str, &str)> {
    match pair.split_once('=') {
        Some((name, text)) if !name.trim().is_empty() => Ok((name.trim(), text)),
        _ => anyhow::bail!("--type 需要 NAME=TEXT 形式，收到 '{pair}'"),
    }
}

fn check_script(path: &Path) -> Outcome {
    let program = match load_program(path) {
        Ok(program) => program,
        Err(outcome) => return outcome,
    };

    let result = analyze_program(&program);
    for diagnostic in &result.diagnostics {
        eprintln!("{diagnostic}");
    }

    if result.has_errors() {
        eprintln!(
            "❌ {} 个错误, {} 个警告",
            result.error_count(),
            result.warn_count()
        );
        Outcome::RuntimeFailure
    } else if result.warn_count() > 0 {
        eprintln!("⚠️  0 个错误, {} 个警告", result.warn_count());
        Outcome::Success
    } else {
        eprintln!("✅ 检查通过，无错误");
        Outcome::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_args() {
        let cli = Cli::try_parse_from([
            "qude",
            "--log-level",
            "debug",
            "run",
            "demo.q",
            "--answer",
            "a",
            "--answer",
            "b",
            "--click",
            "go",
            "--right-click",
            "ok",
        ])
        .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.script, PathBuf::from("demo.q"));
                assert_eq!(args.answers, vec!["a", "b"]);
                assert_eq!(args.clicks, vec!["go"]);
                assert_eq!(args.right_clicks, vec!["ok"]);
                assert!(!args.interactive);
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_typed() {
        assert_eq!(parse_typed("name=alice").unwrap(), ("name", "alice"));
        assert_eq!(parse_typed("pw=a=b").unwrap(), ("pw", "a=b"));
        assert_eq!(parse_typed("pw=").unwrap(), ("pw", ""));
        assert!(parse_typed("=x").is_err());
        assert!(parse_typed("novalue").is_err());
    }

    #[test]
    fn test_exit_codes() {
        let write = |dir: &Path, name: &str, text: &str| {
            let path = dir.join(name);
            std::fs::write(&path, text).unwrap();
            path
        };
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(check_script(&dir.path().join("absent.q")), Outcome::Unreadable);
        let bad = write(dir.path(), "bad.q", "q>\nnonsense here\nq<");
        assert_eq!(check_script(&bad), Outcome::ParseFailure);
        let no_stop = write(dir.path(), "no_stop.q", "q>\nqons.wrt('x')");
        assert_eq!(check_script(&no_stop), Outcome::RuntimeFailure);
        let good = write(dir.path(), "good.q", "q>\nqons.wrt('x')\nq<");
        assert_eq!(check_script(&good), Outcome::Success);
    }

    #[test]
    fn test_init_config_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qude.json");
        init_config(&path).unwrap();
        assert_eq!(CliConfig::load(&path).unwrap(), CliConfig::default());
        assert!(init_config(&path).is_err());
    }

    #[test]
    fn test_run_lifecycle_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_start.q");
        std::fs::write(&path, "qons.wrt('x')\nq<").unwrap();

        let args = RunArgs {
            script: path,
            interactive: false,
            answers: Vec::new(),
            typed: Vec::new(),
            clicks: Vec::new(),
            right_clicks: Vec::new(),
        };
        let outcome = run_script(&args, &CliConfig::default()).unwrap();
        assert_eq!(outcome, Outcome::RuntimeFailure);
    }

    #[test]
    fn test_simulated_clicks_reach_warn_options() {
        let text = "q>\ninsert.button() as b\nwarn.screen('Saved?' <ok>)\nevent;\n\
                    b.RightClickEvent:\nqons.wrt('menu')\n<ok>LeftClickEvent:\nkill.wwindow/\nq<";
        let program = Parser::new().parse("clicks.q", text).unwrap();
        let mut runtime = QudeRuntime::new(program);
        let mut host = MemoryHost::new();
        runtime.run(&mut host).unwrap();
        assert!(runtime.state().warn_window.is_some());

        let args = RunArgs {
            script: PathBuf::from("clicks.q"),
            interactive: false,
            answers: Vec::new(),
            typed: Vec::new(),
            clicks: vec!["ok".to_string(), "missing".to_string()],
            right_clicks: vec!["b".to_string()],
        };
        simulate(&args, &[], &mut runtime, &mut host);

        assert_eq!(host.console_lines(), vec!["menu"]);
        assert!(runtime.state().warn_window.is_none());
        assert!(runtime.warn_option("ok").is_none());
    }
}
