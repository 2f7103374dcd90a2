//! # BXSF 能带网格数据模型
//!
//! 描述 Wannier90 输出的 BXSF 文件：Fermi 能量、k 点网格、倒格矢和各能带在
//! 网格上的本征值。
//!
//! ## 依赖关系
//! - 被 `parsers/bxsf.rs` 构造与写出
//! - 被 `bands/extractor.rs` 和 `fermi/` 使用

use chrono::{DateTime, Local};

/// 单条能带
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    /// 源文件中的能带标签（不一定从 1 开始、不一定连续）
    pub label: i32,

    /// 按源文件网格顺序排列的本征值 (eV)，长度为 nx*ny*nz
    pub energies: Vec<f64>,
}

impl Band {
    pub fn new(label: i32, energies: Vec<f64>) -> Self {
        Band { label, energies }
    }

    /// 能带的最小与最大本征值
    pub fn min_max(&self) -> Option<(f64, f64)> {
        if self.energies.is_empty() {
            return None;
        }
        let min = self.energies.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self
            .energies
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        Some((min, max))
    }
}

/// 单带抽取时附加的来源说明，写出时紧跟在 Fermi 能量行之后
#[derive(Debug, Clone, PartialEq)]
pub struct Provenance {
    /// 生成时间
    pub generated_at: DateTime<Local>,

    /// 倒格矢除以的换算因子
    pub conversion_factor: f64,

    /// Fermi 能量平移量 (eV)
    pub fermi_shift: f64,
}

impl Provenance {
    pub fn new(conversion_factor: f64, fermi_shift: f64) -> Self {
        Provenance {
            generated_at: Local::now(),
            conversion_factor,
            fermi_shift,
        }
    }

    /// 注释行（不含换行符）
    pub fn comment_lines(&self) -> Vec<String> {
        let rule = format!("#{}", "*".repeat(70));
        let mut lines = vec![
            "#".to_string(),
            rule.clone(),
            "# IMPORTANT NOTE!".to_string(),
            "#".to_string(),
            format!(
                "# This file was post-processed at {}",
                self.generated_at.to_rfc3339()
            ),
            format!(
                "# by {} {} extracting only one band.",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ),
            "# Also, IMPORTANT: the reciprocal lattice vectors were all converted".to_string(),
            format!(
                "# from units of 1/ang to 2pi/bohr, dividing by the conversion factor {}",
                self.conversion_factor
            ),
        ];
        if self.fermi_shift != 0.0 {
            lines.push(format!(
                "# In addition, the Fermi energy was shifted by {}",
                self.fermi_shift
            ));
        }
        lines.push(rule);
        lines
    }
}

/// 完整的 BXSF 文档
#[derive(Debug, Clone, PartialEq)]
pub struct GridDocument {
    /// 文件头声明的 Fermi 能量 (eV)
    pub fermi_energy: f64,

    /// k 点网格 (nx, ny, nz)
    pub grid_shape: [usize; 3],

    /// 网格原点，必须为 (0, 0, 0)
    pub origin: [f64; 3],

    /// 三个倒格矢，行向量，单位与源文件一致
    pub lattice_vectors: [[f64; 3]; 3],

    /// 按出现顺序排列的能带
    pub bands: Vec<Band>,

    /// `Fermi Energy:` 行之前的头部行（已去除首尾空白）
    pub preamble: Vec<String>,

    /// `Fermi Energy:` 行与 `BEGIN_BANDGRID_3D_*` 之间的行
    pub interlude: Vec<String>,

    /// `BEGIN_BANDGRID_3D_` 之后的网格名，通常为 `fermi`
    pub grid_title: String,

    /// 抽取后附加的来源说明
    pub provenance: Option<Provenance>,
}

impl GridDocument {
    /// 网格点数 nx*ny*nz
    pub fn grid_volume(&self) -> usize {
        self.grid_shape.iter().product()
    }

    /// 所有能带标签，按文档顺序
    pub fn band_labels(&self) -> Vec<i32> {
        self.bands.iter().map(|b| b.label).collect()
    }

    /// 按标签查找能带
    pub fn band(&self, label: i32) -> Option<&Band> {
        self.bands.iter().find(|b| b.label == label)
    }

    /// 合并所有能带的本征值（用于零温估计）
    pub fn all_energies(&self) -> Vec<f64> {
        self.bands
            .iter()
            .flat_map(|b| b.energies.iter().copied())
            .collect()
    }

    /// 每条能带的本征值切片（用于展宽估计）
    pub fn band_energies(&self) -> Vec<&[f64]> {
        self.bands.iter().map(|b| b.energies.as_slice()).collect()
    }
}
