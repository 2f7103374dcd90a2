//! # extract 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/extract.rs`

use clap::Args;
use std::path::PathBuf;

/// 要抽取的能带
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandSelection {
    /// 所有能带，逐个输出
    All,
    /// 指定标签
    Single(i32),
}

/// 解析能带选择（`all` 或整数标签）
pub fn parse_band_selection(input: &str) -> Result<BandSelection, String> {
    if input.trim().eq_ignore_ascii_case("all") {
        return Ok(BandSelection::All);
    }
    input
        .trim()
        .parse::<i32>()
        .map(BandSelection::Single)
        .map_err(|_| format!("Invalid band '{}'. Use a band label (e.g., 5) or 'all'", input))
}

/// 抽取与写出参数（`extract` 与 `run` 共用）
#[derive(Args, Debug, Clone)]
pub struct ExtractOptions {
    /// Output file name; '_band_<label>.bxsf' replaces a trailing '.bxsf'
    #[arg(short, long, default_value = "skeaf.bxsf")]
    pub output: PathBuf,

    /// Shift the Fermi energy written to the output files by this amount (eV)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub shift_fermi: f64,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0, env = "WAN2SKEAF_JOBS")]
    pub jobs: usize,
}

/// extract 子命令参数
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Input BXSF file
    pub input: PathBuf,

    /// Band label to extract, or 'all'
    #[arg(short, long, value_parser = parse_band_selection)]
    pub band: BandSelection,

    #[command(flatten)]
    pub options: ExtractOptions,
}
