//! # wan2skeaf - 为 SKEAF 准备 BXSF 能带网格
//!
//! 读取 Wannier 插值得到的 BXSF 能带网格，重新估计 Fermi 能量，
//! 并抽取 SKEAF 所需的单带文件。
//!
//! ## 子命令
//! - `fermi`   - Fermi 能级估计（零温或 cold smearing）
//! - `extract` - 单带抽取
//! - `run`     - 依次执行上述两步
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (BXSF 解析与写出)
//!   │     ├── bands/     (单带抽取)
//!   │     ├── fermi/     (Fermi 能级估计)
//!   │     ├── batch/     (并行写出)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod bands;
mod batch;
mod cli;
mod commands;
mod error;
mod fermi;
mod models;
mod parsers;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(e.exit_code());
    }
}
