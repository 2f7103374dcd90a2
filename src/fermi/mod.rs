//! # Fermi 能级估计模块
//!
//! 从 k 点网格上的本征值重新计算 Fermi 能量：
//! - `sharp`: 零温占据计数
//! - `smearing`: cold smearing 有限温度占据 + 二分法求根
//!
//! ## 依赖关系
//! - 被 `commands/fermi.rs` 调用
//! - 使用 `models/fermi.rs`
//! - 子模块: bisection, sharp, smearing

pub mod bisection;
pub mod sharp;
pub mod smearing;

pub use sharp::estimate_sharp;
pub use smearing::{estimate_smeared, SolverOptions};
