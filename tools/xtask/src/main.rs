//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-runtime`: 运行 qude-runtime 覆盖率
//! - `cov-workspace`: 运行 workspace 覆盖率
//! - `script-check`: 检查 `.q` 脚本（语法、生命周期、控件引用）

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser as ClapParser, Subcommand};
use qude_runtime::{Diagnostic, DiagnosticResult, Parser, analyze_program};
use walkdir::WalkDir;
use xshell::{Shell, cmd};

/// 默认脚本目录（相对于 workspace root）
const DEFAULT_SCRIPTS_DIR: &str = "scripts";

#[derive(ClapParser)]
#[command(name = "xtask", about = "开发辅助工具")]
struct Cli {
    #[command(subcommand)]
    command: Task,
}

#[derive(Subcommand)]
enum Task {
    /// 运行 fmt、clippy、test 门禁检查
    CheckAll,
    /// 运行 qude-runtime 覆盖率报告
    CovRuntime,
    /// 运行 workspace 覆盖率报告
    CovWorkspace,
    /// 检查脚本文件；不带参数时检查 scripts/ 下所有 .q 文件
    ScriptCheck {
        /// 指定文件或目录
        path: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    match cli.command {
        Task::CheckAll => {
            step("cargo fmt --all -- --check");
            cmd!(sh, "cargo fmt --all -- --check").run()?;
            step("cargo clippy --workspace --all-targets");
            cmd!(sh, "cargo clippy --workspace --all-targets").run()?;
            step("cargo test --workspace");
            cmd!(sh, "cargo test --workspace").run()?;
        }
        Task::CovRuntime => {
            ensure_cargo_llvm_cov_available(&sh)?;
            step("cargo llvm-cov -p qude-runtime --html");
            cmd!(sh, "cargo llvm-cov -p qude-runtime --all-features --html").run()?;
            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        Task::CovWorkspace => {
            ensure_cargo_llvm_cov_available(&sh)?;
            // xtask 不计入覆盖率
            step("cargo llvm-cov --workspace --exclude xtask --html");
            cmd!(
                sh,
                "cargo llvm-cov --workspace --exclude xtask --all-features --html"
            )
            .run()?;
            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        Task::ScriptCheck { path } => script_check(path.as_deref())?,
    }

    Ok(())
}

fn step(name: &str) {
    eprintln!("\n==> {name}");
}

fn ensure_cargo_llvm_cov_available(sh: &Shell) -> anyhow::Result<()> {
    if cmd!(sh, "cargo llvm-cov --version")
        .quiet()
        .ignore_stdout()
        .run()
        .is_err()
    {
        anyhow::bail!(
            "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
        );
    }
    Ok(())
}

//=============================================================================
// script-check 命令实现
//=============================================================================

/// 脚本检查结果
#[derive(Default)]
struct ScriptCheckResult {
    /// 检查的脚本数量
    scripts_checked: usize,
    /// 读取或解析失败的脚本数量
    parse_errors: usize,
    diagnostics: DiagnosticResult,
}

/// 执行脚本检查
fn script_check(path: Option<&Path>) -> anyhow::Result<()> {
    let files = match path {
        Some(path) if path.is_file() => vec![path.to_path_buf()],
        Some(path) if path.is_dir() => collect_script_files(path),
        Some(path) => anyhow::bail!("路径不存在: {}", path.display()),
        None => {
            let dir = Path::new(DEFAULT_SCRIPTS_DIR);
            if !dir.exists() {
                anyhow::bail!(
                    "默认脚本目录不存在: {}\n请在 workspace 根目录运行，或指定脚本路径",
                    dir.display()
                );
            }
            collect_script_files(dir)
        }
    };

    if files.is_empty() {
        eprintln!("未找到脚本文件（.q）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个脚本文件...\n", files.len());

    let mut result = ScriptCheckResult::default();
    for file in &files {
        check_script_file(file, &mut result);
    }

    print_check_result(&result);

    if result.parse_errors > 0 || result.diagnostics.has_errors() {
        anyhow::bail!("脚本检查发现错误");
    }
    Ok(())
}

/// 收集目录下的所有 `.q` 文件，按路径排序
fn collect_script_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "q"))
        .collect();
    files.sort();
    files
}

/// 检查单个脚本文件
fn check_script_file(file: &Path, result: &mut ScriptCheckResult) {
    let script_id = file.display().to_string();
    result.scripts_checked += 1;

    let content = match std::fs::read_to_string(file) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", Diagnostic::error(&script_id, format!("无法读取文件 - {e}")));
            result.parse_errors += 1;
            return;
        }
    };

    match Parser::new().parse(&script_id, &content) {
        Ok(program) => result.diagnostics.merge(analyze_program(&program)),
        Err(e) => {
            eprintln!("{}", Diagnostic::error(&script_id, e.to_string()));
            result.parse_errors += 1;
        }
    }
}

/// 输出检查结果
fn print_check_result(result: &ScriptCheckResult) {
    eprintln!("─────────────────────────────────────────────────────");
    eprintln!("检查完成: {} 个脚本", result.scripts_checked);
    eprintln!();

    for diag in &result.diagnostics.diagnostics {
        eprintln!("{diag}");
    }

    let error_count = result.parse_errors + result.diagnostics.error_count();
    let warn_count = result.diagnostics.warn_count();

    eprintln!();
    if error_count > 0 {
        eprintln!("❌ {error_count} 个错误, {warn_count} 个警告");
    } else if warn_count > 0 {
        eprintln!("⚠️  0 个错误, {warn_count} 个警告");
    } else {
        eprintln!("✅ 检查通过，无错误");
    }
}
