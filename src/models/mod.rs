//! # 数据模型模块
//!
//! 定义 BXSF 能带网格和 Fermi 能级估计结果的数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`、`bands/`、`fermi/` 和 `commands/` 使用
//! - 子模块: grid, fermi

pub mod fermi;
pub mod grid;

pub use fermi::{
    ElectronCount, SharpEstimate, SmearedEstimate, Smearing, SmearingType, RYDBERG_EV,
};
pub use grid::{Band, GridDocument, Provenance};
