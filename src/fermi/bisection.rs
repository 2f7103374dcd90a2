//! # 二分法求根
//!
//! 在给定区间内求单变量函数的零点，收敛判据与常见数值库的 `bisect` 一致：
//! `|dx| < xtol + rtol * |x|`。
//!
//! ## 依赖关系
//! - 被 `fermi/smearing.rs` 调用

/// 二分法参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BisectionConfig {
    /// 绝对容差
    pub xtol: f64,
    /// 相对容差
    pub rtol: f64,
    /// 最大迭代次数
    pub max_iter: usize,
}

impl Default for BisectionConfig {
    fn default() -> Self {
        BisectionConfig {
            xtol: 2e-12,
            rtol: 4.0 * f64::EPSILON,
            max_iter: 100,
        }
    }
}

/// 求得的零点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Root {
    pub x: f64,
    pub iterations: usize,
}

/// 二分法失败原因
#[derive(Debug, Clone, PartialEq)]
pub enum BisectionError {
    /// 区间两端函数值同号
    NoSignChange { lo: f64, hi: f64, f_lo: f64, f_hi: f64 },
    /// 超过最大迭代次数
    NotConverged { iterations: usize, x: f64 },
    /// 函数值不是有限数
    NotFinite { x: f64 },
}

impl std::fmt::Display for BisectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BisectionError::NoSignChange { lo, hi, f_lo, f_hi } => write!(
                f,
                "no sign change in [{}, {}] (f = {:e}, {:e})",
                lo, hi, f_lo, f_hi
            ),
            BisectionError::NotConverged { iterations, x } => {
                write!(f, "no convergence after {} iterations (last x = {})", iterations, x)
            }
            BisectionError::NotFinite { x } => write!(f, "function is not finite at x = {}", x),
        }
    }
}

fn evaluate<F: Fn(f64) -> f64>(f: &F, x: f64) -> Result<f64, BisectionError> {
    let value = f(x);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(BisectionError::NotFinite { x })
    }
}

/// 在 [lo, hi] 内求 f 的零点
pub fn bisect<F: Fn(f64) -> f64>(
    f: F,
    lo: f64,
    hi: f64,
    config: &BisectionConfig,
) -> Result<Root, BisectionError> {
    let f_lo = evaluate(&f, lo)?;
    let f_hi = evaluate(&f, hi)?;

    if f_lo == 0.0 {
        return Ok(Root { x: lo, iterations: 0 });
    }
    if f_hi == 0.0 {
        return Ok(Root { x: hi, iterations: 0 });
    }
    if (f_lo > 0.0) == (f_hi > 0.0) {
        return Err(BisectionError::NoSignChange { lo, hi, f_lo, f_hi });
    }

    // 从函数值为负的一端出发
    let (mut x_neg, mut dx) = if f_lo < 0.0 { (lo, hi - lo) } else { (hi, lo - hi) };
    let mut x_mid = x_neg;

    for iteration in 1..=config.max_iter {
        dx *= 0.5;
        x_mid = x_neg + dx;
        let f_mid = evaluate(&f, x_mid)?;
        if f_mid <= 0.0 {
            x_neg = x_mid;
        }
        if f_mid == 0.0 || dx.abs() < config.xtol + config.rtol * x_mid.abs() {
            return Ok(Root {
                x: x_mid,
                iterations: iteration,
            });
        }
    }

    Err(BisectionError::NotConverged {
        iterations: config.max_iter,
        x: x_mid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_root() {
        let root = bisect(|x| x * x * x - 2.0, 0.0, 2.0, &BisectionConfig::default()).unwrap();
        assert!((root.x - 2f64.powf(1.0 / 3.0)).abs() < 1e-6);
        assert!(root.iterations > 1);
    }

    #[test]
    fn test_decreasing_function() {
        let root = bisect(|x| 1.5 - x, -3.0, 4.0, &BisectionConfig::default()).unwrap();
        assert!((root.x - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_exact_zero_at_midpoint() {
        let root = bisect(|x| x - 1.0, 0.0, 2.0, &BisectionConfig::default()).unwrap();
        assert_eq!(root.x, 1.0);
        assert_eq!(root.iterations, 1);
    }

    #[test]
    fn test_root_at_endpoint() {
        let root = bisect(|x| x, 0.0, 1.0, &BisectionConfig::default()).unwrap();
        assert_eq!(root, Root { x: 0.0, iterations: 0 });
    }

    #[test]
    fn test_no_sign_change() {
        let err = bisect(|x| x * x + 1.0, -1.0, 1.0, &BisectionConfig::default()).unwrap_err();
        assert!(matches!(err, BisectionError::NoSignChange { .. }));
    }

    #[test]
    fn test_iteration_budget() {
        let config = BisectionConfig {
            max_iter: 3,
            ..BisectionConfig::default()
        };
        let err = bisect(|x| x - 0.123456, 0.0, 1.0, &config).unwrap_err();
        assert!(matches!(err, BisectionError::NotConverged { iterations: 3, .. }));
    }

    #[test]
    fn test_not_finite() {
        let err = bisect(|x| 1.0 / x, 0.0, 1.0, &BisectionConfig::default()).unwrap_err();
        assert_eq!(err, BisectionError::NotFinite { x: 0.0 });
    }
}
