//! # 解析器模块
//!
//! 提供 Wannier90 BXSF 能带网格文件的解析与写出。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: bxsf

pub mod bxsf;

pub use bxsf::{parse_bxsf_content, parse_bxsf_file, to_bxsf_string};
