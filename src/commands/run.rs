//! # run 子命令实现
//!
//! 解析一次 BXSF，先重新估计 Fermi 能量，再抽取能带。
//! Fermi 能级估计失败只报告，不影响后续抽取。
//!
//! ## 依赖关系
//! - 使用 `cli/run.rs` 定义的参数
//! - 复用 `commands/fermi.rs` 与 `commands/extract.rs`
//! - 使用 `chrono` 打印起止时间

use crate::cli::run::RunArgs;
use crate::commands::{extract, fermi};
use crate::error::Result;
use crate::models::ElectronCount;
use crate::parsers;
use crate::utils::output;

use chrono::Local;

/// 执行完整流程
pub fn execute(args: RunArgs) -> Result<()> {
    output::print_header("wan2skeaf");
    output::print_report("Started on", Local::now().format("%Y-%m-%d %H:%M:%S"));

    let doc = parsers::parse_bxsf_file(&args.input)?;
    output::print_success(&format!("Loaded '{}'", args.input.display()));
    fermi::report_document(&doc);

    if let Some(num_electrons) = args.num_electrons {
        let count = ElectronCount::from_signed(num_electrons);
        let status = fermi::estimate(&doc, count, &args.estimate).and_then(|outcome| {
            fermi::report_outcome(&outcome, count.is_scan());
            outcome.into_status()
        });
        if let Err(e) = status {
            output::print_error(&format!("Error when recalculating the Fermi energy: {}", e));
        }
    }

    if let Some(selection) = args.band {
        extract::extract_and_write(&doc, selection, &args.extract)?;
    }

    output::print_report("Job done at", Local::now().format("%Y-%m-%d %H:%M:%S"));
    Ok(())
}
