//! # Fermi 能级估计的数据模型
//!
//! 电子数请求、展宽参数与估计结果。
//!
//! ## 依赖关系
//! - 被 `fermi/` 计算模块使用
//! - 被 `commands/fermi.rs` 输出表格与 CSV

use crate::error::{Result, SkeafError};
use serde::Serialize;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// 1 Ry 对应的 eV
pub const RYDBERG_EV: f64 = 13.605693122994;

/// 电子数请求：固定值或扫描区间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElectronCount {
    Fixed(u32),
    /// 闭区间 [low, high]
    Scan { low: u32, high: u32 },
}

impl ElectronCount {
    /// 负数表示扫描 [|n|/2, |n|]
    pub fn from_signed(num_electrons: i32) -> Self {
        if num_electrons < 0 {
            let high = num_electrons.unsigned_abs();
            ElectronCount::Scan {
                low: high / 2,
                high,
            }
        } else {
            ElectronCount::Fixed(num_electrons as u32)
        }
    }

    pub fn counts(&self) -> RangeInclusive<u32> {
        match *self {
            ElectronCount::Fixed(n) => n..=n,
            ElectronCount::Scan { low, high } => low..=high,
        }
    }

    pub fn is_scan(&self) -> bool {
        matches!(self, ElectronCount::Scan { .. })
    }
}

impl std::fmt::Display for ElectronCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElectronCount::Fixed(n) => write!(f, "{}", n),
            ElectronCount::Scan { low, high } => write!(f, "{}..={}", low, high),
        }
    }
}

/// 展宽类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SmearingType {
    /// Marzari-Vanderbilt cold smearing
    Cold,
}

impl FromStr for SmearingType {
    type Err = SkeafError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "cold" => Ok(SmearingType::Cold),
            other => Err(SkeafError::InvalidSmearingType {
                smearing: other.to_string(),
                spin_degeneracy: 2,
            }),
        }
    }
}

impl std::fmt::Display for SmearingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SmearingType::Cold => write!(f, "cold"),
        }
    }
}

/// 展宽参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smearing {
    pub kind: SmearingType,
    /// 展宽宽度 (eV)
    pub width: f64,
}

impl Smearing {
    pub fn cold(width: f64) -> Self {
        Smearing {
            kind: SmearingType::Cold,
            width,
        }
    }
}

/// 零温估计结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharpEstimate {
    pub num_electrons: u32,
    /// 被占据的网格点数
    pub num_occupied: usize,
    /// 最高占据能级 (eV)
    pub highest_occupied: f64,
    /// 最低未占据能级 (eV)
    pub lowest_unoccupied: f64,
    /// 两者中点 (eV)
    pub fermi_energy: f64,
    /// 自旋简并且电子数为奇数时两点各半占据
    pub half_occupation: bool,
}

impl SharpEstimate {
    pub fn fermi_energy_ry(&self) -> f64 {
        self.fermi_energy / RYDBERG_EV
    }
}

/// 有限温度（展宽）估计结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmearedEstimate {
    pub num_electrons: u32,
    pub smearing: SmearingType,
    /// 展宽宽度 (eV)
    pub smearing_width: f64,
    /// Fermi 能量 (eV)
    pub fermi_energy: f64,
    /// Fermi 能量处的电子数 N(E_F)
    pub occupation: f64,
    /// N(E_F) - 目标电子数
    pub residual: f64,
    /// 二分迭代次数
    pub iterations: usize,
    /// Fermi 能量以下最近的本征值
    pub closest_below: Option<f64>,
    /// Fermi 能量以上最近的本征值
    pub closest_above: Option<f64>,
}

impl SmearedEstimate {
    pub fn fermi_energy_ry(&self) -> f64 {
        self.fermi_energy / RYDBERG_EV
    }
}
