//! # 有限温度（cold smearing）Fermi 能级估计
//!
//! 对每个 Fermi 能量猜测值 E_F，计算 Marzari-Vanderbilt cold smearing 占据数
//! ```text
//! x    = (E_F - ε) / T
//! f(x) = erfc(1/√2 - x) + √(2/π) · exp((√2 - x)·x - 1/2)
//! ```
//! 每条能带对所有 k 点取平均，再对能带求和得到 N(E_F)。在全部本征值的
//! [min, max] 区间上用二分法求解 N(E_F) = 目标电子数。
//!
//! 占据数函数已包含自旋简并因子 2，因此只支持 spin_degeneracy == 2。
//!
//! ## 依赖关系
//! - 被 `commands/fermi.rs` 调用
//! - 使用 `fermi/bisection.rs` 求根
//! - 使用 `models/fermi.rs`

use crate::error::{Result, SkeafError};
use crate::fermi::bisection::{bisect, BisectionConfig};
use crate::models::{ElectronCount, SmearedEstimate, Smearing, SmearingType};

use rayon::prelude::*;
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_2_SQRT_PI, SQRT_2};

/// √(2/π)
const SQRT_2_OVER_PI: f64 = FRAC_2_SQRT_PI * FRAC_1_SQRT_2;

/// 求解参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOptions {
    pub bisection: BisectionConfig,
    /// 收敛后允许的电子数偏差
    pub tol_n_electrons: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            bisection: BisectionConfig::default(),
            tol_n_electrons: 1e-6,
        }
    }
}

/// cold smearing 占据数，取值范围约为 [0, 2]
pub fn cold_occupation(x: f64) -> f64 {
    libm::erfc(FRAC_1_SQRT_2 - x) + SQRT_2_OVER_PI * ((SQRT_2 - x) * x - 0.5).exp()
}

/// 单条能带在所有 k 点上的平均占据数
pub fn band_occupation(energies: &[f64], fermi_energy: f64, width: f64) -> f64 {
    let total: f64 = energies
        .iter()
        .map(|&e| cold_occupation((fermi_energy - e) / width))
        .sum();
    total / energies.len() as f64
}

/// 总电子数 N(E_F)
///
/// 各能带并行计算，按能带顺序串行求和，保证结果可重复。
pub fn electron_count<B>(bands: &[B], fermi_energy: f64, width: f64) -> f64
where
    B: AsRef<[f64]> + Sync,
{
    let per_band: Vec<f64> = bands
        .par_iter()
        .map(|band| band_occupation(band.as_ref(), fermi_energy, width))
        .collect();
    per_band.iter().sum()
}

/// 对每个请求的电子数求解展宽 Fermi 能量
///
/// 外层错误表示请求本身无效；内层每个电子数各自给出结果。
pub fn estimate_smeared<B>(
    per_band_energies: &[B],
    smearing: Smearing,
    count: ElectronCount,
    spin_degeneracy: u32,
    options: &SolverOptions,
) -> Result<Vec<Result<SmearedEstimate>>>
where
    B: AsRef<[f64]> + Sync,
{
    if spin_degeneracy != 2 || smearing.kind != SmearingType::Cold {
        return Err(SkeafError::InvalidSmearingType {
            smearing: smearing.kind.to_string(),
            spin_degeneracy,
        });
    }
    if !(smearing.width.is_finite() && smearing.width > 0.0) {
        return Err(SkeafError::InvalidArgument(format!(
            "smearing width must be positive, got {}",
            smearing.width
        )));
    }
    if per_band_energies.is_empty() || per_band_energies.iter().any(|b| b.as_ref().is_empty()) {
        return Err(SkeafError::InvalidArgument(
            "every band needs at least one eigenvalue".to_string(),
        ));
    }

    let mut sorted: Vec<f64> = per_band_energies
        .iter()
        .flat_map(|b| b.as_ref().iter().copied())
        .collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let e_min = sorted[0];
    let e_max = sorted[sorted.len() - 1];

    Ok(count
        .counts()
        .map(|n| {
            smeared_for_count(per_band_energies, &sorted, (e_min, e_max), smearing, n, options)
        })
        .collect())
}

fn smeared_for_count<B>(
    bands: &[B],
    sorted: &[f64],
    (e_min, e_max): (f64, f64),
    smearing: Smearing,
    num_electrons: u32,
    options: &SolverOptions,
) -> Result<SmearedEstimate>
where
    B: AsRef<[f64]> + Sync,
{
    let target = num_electrons as f64;
    let failed = |reason: String| SkeafError::FermiLevelEstimationFailed {
        num_electrons,
        smearing: smearing.kind.to_string(),
        width: smearing.width,
        reason,
    };

    let root = bisect(
        |ef| electron_count(bands, ef, smearing.width) - target,
        e_min,
        e_max,
        &options.bisection,
    )
    .map_err(|e| failed(e.to_string()))?;

    let occupation = electron_count(bands, root.x, smearing.width);
    let residual = occupation - target;
    if residual.abs() > options.tol_n_electrons {
        return Err(failed(format!(
            "failed to find Fermi energy within tolerance, Δn_elec = {:e}",
            residual
        )));
    }

    let split = sorted.partition_point(|&e| e <= root.x);

    Ok(SmearedEstimate {
        num_electrons,
        smearing: smearing.kind,
        smearing_width: smearing.width,
        fermi_energy: root.x,
        occupation,
        residual,
        iterations: root.iterations,
        closest_below: split.checked_sub(1).map(|i| sorted[i]),
        closest_above: sorted.get(split).copied(),
    })
}
