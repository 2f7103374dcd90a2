//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `fermi`: 由 k 网格本征值重新估计 Fermi 能量
//! - `extract`: 抽取单带 BXSF 供 SKEAF 使用
//! - `run`: 在同一份文档上依次执行上述两步
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: fermi, extract, run

pub mod extract;
pub mod fermi;
pub mod run;

use clap::{Parser, Subcommand};

/// wan2skeaf - 为 SKEAF 准备 BXSF 能带网格
#[derive(Parser)]
#[command(name = "wan2skeaf")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(
    about = "Prepare Wannier-interpolated BXSF band grids for SKEAF and estimate the Fermi energy",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Estimate the Fermi energy from the eigenvalues on the k-mesh
    Fermi(fermi::FermiArgs),

    /// Extract single bands into SKEAF-ready BXSF files
    Extract(extract::ExtractArgs),

    /// Estimate the Fermi energy, then extract bands from the same file
    Run(run::RunArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use extract::BandSelection;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_negative_electron_count() {
        let cli = Cli::try_parse_from(["wan2skeaf", "fermi", "nscf.bxsf", "-n", "-4"]).unwrap();
        match cli.command {
            Commands::Fermi(args) => {
                assert_eq!(args.num_electrons, -4);
                assert_eq!(args.options.num_spin, 2);
                assert!(args.options.smearing.is_none());
            }
            _ => panic!("expected fermi subcommand"),
        }
    }

    #[test]
    fn test_extract_defaults() {
        let cli = Cli::try_parse_from(["wan2skeaf", "extract", "nscf.bxsf", "-b", "all"]).unwrap();
        match cli.command {
            Commands::Extract(args) => {
                assert_eq!(args.band, BandSelection::All);
                assert_eq!(args.options.output.to_str(), Some("skeaf.bxsf"));
                assert_eq!(args.options.shift_fermi, 0.0);
            }
            _ => panic!("expected extract subcommand"),
        }
    }

    #[test]
    fn test_run_optional_steps() {
        let cli = Cli::try_parse_from([
            "wan2skeaf",
            "run",
            "nscf.bxsf",
            "-n",
            "9",
            "--smearing",
            "cold",
            "--smearing-width",
            "0.136",
        ])
        .unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.num_electrons, Some(9));
                assert!(args.band.is_none());
                assert_eq!(args.estimate.smearing.as_deref(), Some("cold"));
                assert_eq!(args.estimate.smearing_width, Some(0.136));
            }
            _ => panic!("expected run subcommand"),
        }
    }
}
