//! # fermi 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/fermi.rs`

use clap::Args;
use std::path::PathBuf;

/// Fermi 能级估计参数（`fermi` 与 `run` 共用）
#[derive(Args, Debug, Clone)]
pub struct EstimateOptions {
    /// Spin degeneracy: 2 without spin-orbit coupling, 1 with it
    #[arg(short = 's', long, default_value_t = 2)]
    pub num_spin: u32,

    /// Smearing type for a finite-temperature estimate (supported: cold)
    #[arg(long, requires = "smearing_width")]
    pub smearing: Option<String>,

    /// Smearing width in eV
    #[arg(long, requires = "smearing")]
    pub smearing_width: Option<f64>,

    /// Largest accepted deviation of the electron count after convergence
    #[arg(long, default_value_t = 1e-6)]
    pub tol_n_electrons: f64,
}

/// fermi 子命令参数
#[derive(Args, Debug)]
pub struct FermiArgs {
    /// Input BXSF file
    pub input: PathBuf,

    /// Number of electrons; a negative value -N scans N/2..=N
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    pub num_electrons: i32,

    #[command(flatten)]
    pub options: EstimateOptions,

    /// Save every estimate to a CSV file
    #[arg(long)]
    pub output_csv: Option<PathBuf>,
}
