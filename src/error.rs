//! # 统一错误处理模块
//!
//! 定义 wan2skeaf 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// wan2skeaf 统一错误类型
#[derive(Error, Debug)]
pub enum SkeafError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Input file {path} does not exist")]
    InputNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // BXSF 格式错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid BXSF at line {line}: {reason}")]
    Format { line: usize, reason: String },

    #[error("Grid size mismatch for {what}: expected {expected}, found {found}")]
    GridSizeMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("Band {label} not found in BXSF (available: {available})")]
    BandNotFound { label: i32, available: String },

    // ─────────────────────────────────────────────────────────────
    // Fermi 能级估计错误
    // ─────────────────────────────────────────────────────────────
    #[error("Occupation index {num_occupied} out of range for {num_electrons} electrons ({available} eigenvalues on the grid)")]
    OccupationOutOfRange {
        num_electrons: u32,
        num_occupied: usize,
        available: usize,
    },

    #[error("Smearing type '{smearing}' is not supported with spin degeneracy {spin_degeneracy}")]
    InvalidSmearingType {
        smearing: String,
        spin_degeneracy: u32,
    },

    #[error("Failed to estimate Fermi energy for {num_electrons} electrons ({smearing} smearing, width {width} eV): {reason}")]
    FermiLevelEstimationFailed {
        num_electrons: u32,
        smearing: String,
        width: f64,
        reason: String,
    },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{failed} of {total} band(s) could not be written")]
    BatchFailed { failed: usize, total: usize },

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl SkeafError {
    /// 格式错误的便捷构造
    pub fn format(line: usize, reason: impl Into<String>) -> Self {
        SkeafError::Format {
            line,
            reason: reason.into(),
        }
    }

    /// 进程退出码：输入文件缺失为 2，其余为 1
    pub fn exit_code(&self) -> i32 {
        match self {
            SkeafError::InputNotFound { .. } => 2,
            _ => 1,
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, SkeafError>;
