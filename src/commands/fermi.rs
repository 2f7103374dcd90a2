//! # fermi 子命令实现
//!
//! 读取 BXSF，按请求的电子数重新估计 Fermi 能量。
//!
//! ## 功能
//! - 零温（中点）估计或 cold smearing 估计
//! - 电子数为负时扫描区间，逐个报告
//! - 终端表格、`key: value` 报告行与可选 CSV 导出
//!
//! ## 依赖关系
//! - 使用 `cli/fermi.rs` 定义的参数
//! - 使用 `parsers/bxsf.rs`, `fermi/`
//! - 使用 `utils/output.rs`
//! - 被 `commands/run.rs` 复用

use crate::cli::fermi::{EstimateOptions, FermiArgs};
use crate::error::{Result, SkeafError};
use crate::fermi::{estimate_sharp, estimate_smeared, SolverOptions};
use crate::models::{ElectronCount, GridDocument, SharpEstimate, SmearedEstimate, Smearing, SmearingType};
use crate::parsers;
use crate::utils::output;

use std::path::Path;
use tabled::{Table, Tabled};

/// 一次请求的全部估计结果
#[derive(Debug)]
pub enum FermiOutcome {
    Sharp(Vec<Result<SharpEstimate>>),
    Smeared(Vec<Result<SmearedEstimate>>),
}

impl FermiOutcome {
    /// 成功估计的数量
    pub fn succeeded(&self) -> usize {
        match self {
            FermiOutcome::Sharp(results) => results.iter().filter(|r| r.is_ok()).count(),
            FermiOutcome::Smeared(results) => results.iter().filter(|r| r.is_ok()).count(),
        }
    }

    /// 没有任何电子数估计成功时返回第一个错误
    pub fn into_status(self) -> Result<()> {
        if self.succeeded() > 0 {
            return Ok(());
        }
        let first_error = match self {
            FermiOutcome::Sharp(results) => results.into_iter().find_map(|r| r.err()),
            FermiOutcome::Smeared(results) => results.into_iter().find_map(|r| r.err()),
        };
        match first_error {
            Some(e) => Err(e),
            None => Err(SkeafError::InvalidArgument(
                "no electron count requested".to_string(),
            )),
        }
    }
}

/// 估计结果表格行
#[derive(Debug, Clone, Tabled)]
struct EstimateRow {
    #[tabled(rename = "N_elec")]
    num_electrons: u32,
    #[tabled(rename = "E_F (eV)")]
    fermi_ev: String,
    #[tabled(rename = "E_F (Ry)")]
    fermi_ry: String,
    #[tabled(rename = "Below (eV)")]
    below: String,
    #[tabled(rename = "Above (eV)")]
    above: String,
    #[tabled(rename = "Note")]
    note: String,
}

/// 执行 Fermi 能级估计
pub fn execute(args: FermiArgs) -> Result<()> {
    output::print_header("Fermi Energy Estimation");

    let doc = parsers::parse_bxsf_file(&args.input)?;
    output::print_success(&format!("Loaded '{}'", args.input.display()));
    report_document(&doc);

    let count = ElectronCount::from_signed(args.num_electrons);
    let outcome = estimate(&doc, count, &args.options)?;
    report_outcome(&outcome, count.is_scan());

    if let Some(ref path) = args.output_csv {
        save_csv(&outcome, path)?;
        output::print_success(&format!("Estimates saved to '{}'", path.display()));
    }

    outcome.into_status()
}

/// 打印文档概要
pub fn report_document(doc: &GridDocument) {
    output::print_report("Fermi Energy from file", doc.fermi_energy);
    output::print_report("Number of bands", doc.bands.len());
    output::print_report(
        "Grid shape",
        format!(
            "{}x{}x{}",
            doc.grid_shape[0], doc.grid_shape[1], doc.grid_shape[2]
        ),
    );
}

/// 按参数选择零温或展宽估计
pub fn estimate(
    doc: &GridDocument,
    count: ElectronCount,
    options: &EstimateOptions,
) -> Result<FermiOutcome> {
    match count {
        ElectronCount::Scan { low, high } => output::print_info(&format!(
            "Requested a negative number of electrons, scanning from {} to {}",
            low, high
        )),
        ElectronCount::Fixed(n) => output::print_report("Number of electrons", n),
    }
    output::print_report("Spin degeneracy", options.num_spin);

    match (&options.smearing, options.smearing_width) {
        (Some(kind), Some(width)) => {
            let kind: SmearingType = kind.parse().map_err(|_| SkeafError::InvalidSmearingType {
                smearing: kind.clone(),
                spin_degeneracy: options.num_spin,
            })?;
            output::print_report("Smearing type", kind);
            output::print_report("Smearing width", width);
            output::print_report("Occupation prefactor", options.num_spin);
            output::print_report("Tolerance for number of electrons", options.tol_n_electrons);

            let solver = SolverOptions {
                tol_n_electrons: options.tol_n_electrons,
                ..SolverOptions::default()
            };
            let per_band = doc.band_energies();
            let results = estimate_smeared(
                &per_band,
                Smearing { kind, width },
                count,
                options.num_spin,
                &solver,
            )?;
            Ok(FermiOutcome::Smeared(results))
        }
        (None, None) => {
            let results = estimate_sharp(
                &doc.all_energies(),
                doc.grid_shape,
                count,
                options.num_spin,
            )?;
            Ok(FermiOutcome::Sharp(results))
        }
        _ => Err(SkeafError::InvalidArgument(
            "--smearing and --smearing-width must be given together".to_string(),
        )),
    }
}

/// 打印报告行与结果表格
///
/// 单个电子数的失败留给调用方报告，扫描时的失败逐个以警告打印。
pub fn report_outcome(outcome: &FermiOutcome, is_scan: bool) {
    let mut rows = Vec::new();

    match outcome {
        FermiOutcome::Sharp(results) => {
            for result in results {
                match result {
                    Ok(est) => {
                        report_estimate(
                            est.num_electrons,
                            est.fermi_energy,
                            est.fermi_energy_ry(),
                            Some(est.highest_occupied),
                            Some(est.lowest_unoccupied),
                        );
                        if est.half_occupation {
                            output::print_warning(
                                "Odd number of electrons with spin degeneracy 2: the highest level is half occupied",
                            );
                        }
                        rows.push(EstimateRow {
                            num_electrons: est.num_electrons,
                            fermi_ev: format!("{:.6}", est.fermi_energy),
                            fermi_ry: format!("{:.6}", est.fermi_energy_ry()),
                            below: format!("{:.6}", est.highest_occupied),
                            above: format!("{:.6}", est.lowest_unoccupied),
                            note: if est.half_occupation {
                                "half occupied".to_string()
                            } else {
                                String::new()
                            },
                        });
                    }
                    Err(e) if is_scan => output::print_warning(&e.to_string()),
                    Err(_) => {}
                }
            }
        }
        FermiOutcome::Smeared(results) => {
            for result in results {
                match result {
                    Ok(est) => {
                        report_estimate(
                            est.num_electrons,
                            est.fermi_energy,
                            est.fermi_energy_ry(),
                            est.closest_below,
                            est.closest_above,
                        );
                        rows.push(EstimateRow {
                            num_electrons: est.num_electrons,
                            fermi_ev: format!("{:.6}", est.fermi_energy),
                            fermi_ry: format!("{:.6}", est.fermi_energy_ry()),
                            below: format_level(est.closest_below),
                            above: format_level(est.closest_above),
                            note: format!("Δn_elec = {:.1e}", est.residual),
                        });
                    }
                    Err(e) if is_scan => output::print_warning(&e.to_string()),
                    Err(_) => {}
                }
            }
        }
    }

    if !rows.is_empty() {
        output::print_header("Fermi Energy Estimates");
        println!("{}", Table::new(&rows));
    }
}

fn report_estimate(
    num_electrons: u32,
    fermi_energy: f64,
    fermi_energy_ry: f64,
    below: Option<f64>,
    above: Option<f64>,
) {
    output::print_separator();
    output::print_report("Number of electrons", num_electrons);
    output::print_report("Computed Fermi energy", fermi_energy);
    output::print_report("Computed Fermi energy in Ry", fermi_energy_ry);
    output::print_report("Closest eigenvalue below Fermi energy", format_level(below));
    output::print_report("Closest eigenvalue above Fermi energy", format_level(above));
}

fn format_level(level: Option<f64>) -> String {
    level
        .map(|e| format!("{:.6}", e))
        .unwrap_or_else(|| "none".to_string())
}

/// 保存成功的估计到 CSV
fn save_csv(outcome: &FermiOutcome, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    match outcome {
        FermiOutcome::Sharp(results) => {
            for est in results.iter().flatten() {
                wtr.serialize(est)?;
            }
        }
        FermiOutcome::Smeared(results) => {
            for est in results.iter().flatten() {
                wtr.serialize(est)?;
            }
        }
    }

    wtr.flush().map_err(|e| SkeafError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}
