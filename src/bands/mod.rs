//! # 能带处理模块
//!
//! 为 SKEAF 准备单带 BXSF。
//!
//! ## 依赖关系
//! - 被 `commands/extract.rs` 使用
//! - 子模块: extractor

pub mod extractor;

pub use extractor::{extract_all, extract_one, BOHR_TO_ANG, CONV_FACTOR};
