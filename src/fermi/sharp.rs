//! # 零温 Fermi 能级估计
//!
//! 将所有能带在所有 k 点上的本征值合并排序，按电子数计算被占据的网格点数，
//! Fermi 能量取最高占据与最低未占据能级的中点。
//!
//! ## 依赖关系
//! - 被 `commands/fermi.rs` 调用
//! - 使用 `models/fermi.rs`

use crate::error::{Result, SkeafError};
use crate::models::{ElectronCount, SharpEstimate};

/// 对每个请求的电子数计算零温 Fermi 能量
///
/// 外层错误表示请求本身无效；内层每个电子数各自给出结果，扫描时不会提前终止。
pub fn estimate_sharp(
    all_energies: &[f64],
    grid_shape: [usize; 3],
    count: ElectronCount,
    spin_degeneracy: u32,
) -> Result<Vec<Result<SharpEstimate>>> {
    if spin_degeneracy == 0 {
        return Err(SkeafError::InvalidArgument(
            "spin degeneracy must be positive".to_string(),
        ));
    }
    if all_energies.is_empty() {
        return Err(SkeafError::InvalidArgument(
            "no eigenvalues to estimate the Fermi energy from".to_string(),
        ));
    }

    let mut sorted = all_energies.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let grid_volume: usize = grid_shape.iter().product();

    Ok(count
        .counts()
        .map(|n| sharp_for_count(&sorted, grid_volume, n, spin_degeneracy))
        .collect())
}

fn sharp_for_count(
    sorted: &[f64],
    grid_volume: usize,
    num_electrons: u32,
    spin_degeneracy: u32,
) -> Result<SharpEstimate> {
    let num_occupied = grid_volume * num_electrons as usize / spin_degeneracy as usize;

    if num_occupied == 0 || num_occupied >= sorted.len() {
        return Err(SkeafError::OccupationOutOfRange {
            num_electrons,
            num_occupied,
            available: sorted.len(),
        });
    }

    let highest_occupied = sorted[num_occupied - 1];
    let lowest_unoccupied = sorted[num_occupied];

    Ok(SharpEstimate {
        num_electrons,
        num_occupied,
        highest_occupied,
        lowest_unoccupied,
        fermi_energy: (highest_occupied + lowest_unoccupied) / 2.0,
        half_occupation: spin_degeneracy == 2 && num_electrons % 2 == 1,
    })
}
