//! # run 子命令 CLI 定义
//!
//! 两个步骤都是可选的：未给出电子数时跳过 Fermi 能级估计，未给出能带时跳过抽取。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 复用 `cli/fermi.rs` 与 `cli/extract.rs` 的参数组
//! - 参数传递给 `commands/run.rs`

use super::extract::{parse_band_selection, BandSelection, ExtractOptions};
use super::fermi::EstimateOptions;

use clap::Args;
use std::path::PathBuf;

/// run 子命令参数
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Input BXSF file
    pub input: PathBuf,

    /// Number of electrons; a negative value -N scans N/2..=N
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    pub num_electrons: Option<i32>,

    /// Band label to extract, or 'all'
    #[arg(short, long, value_parser = parse_band_selection)]
    pub band: Option<BandSelection>,

    #[command(flatten)]
    pub estimate: EstimateOptions,

    #[command(flatten)]
    pub extract: ExtractOptions,
}
