//! 逐轴组合一维变换.

use super::axes::AxisMask;
use super::lines::transform_axis;
use super::{ConfigError, EdtError, EdtResult, FovBoundary, Label};
use log::debug;
use ndarray::{Array3, ArrayView3};

/// 计算原始平方距离场.
///
/// 从处处 `+inf` 出发, 按轴序升序依次沿每个打开的轴做一次一维变换,
/// 第 `k` 个轴使用间距 `spacing[k]`. 关闭的轴不做任何处理,
/// 相当于在其余两个轴张成的每个切片上独立地做二维变换.
///
/// 结果是每个体素中心到最近异标签体素中心的最小平方物理距离.
/// 在 [`FovBoundary::Closed`] 策略下, 非零标签体素还会看到每个打开轴上
/// 视野外一格的虚拟边界.
///
/// # 返回值
///
/// 1. 网格为空时返回 `Err(EdtError::EmptyGrid)`.
/// 2. 体素边长不是有限正数时返回 `Err(EdtError::Config(..))`.
/// 3. 整个网格只有一种标签时返回 `Err(EdtError::SingleLabel)`.
/// 4. 有体素找不到边界时返回 `Err(EdtError::Unbounded(n))`,
///   `n` 为这类体素个数. 二维模式下整片同为背景时会出现.
pub fn squared_distance_field<T: Label>(
    labels: ArrayView3<T>,
    spacing: [f64; 3],
    axes: AxisMask,
    fov: FovBoundary,
) -> EdtResult<Array3<f64>> {
    if labels.is_empty() {
        return Err(EdtError::EmptyGrid);
    }
    if spacing.iter().any(|s| !s.is_finite() || *s <= 0.0) {
        return Err(ConfigError::InvalidSpacing(spacing).into());
    }
    let first = labels.iter().next().copied().ok_or(EdtError::EmptyGrid)?;
    if labels.iter().all(|l| *l == first) {
        return Err(EdtError::SingleLabel);
    }

    let mut dist = Array3::from_elem(labels.raw_dim(), f64::INFINITY);
    for axis in axes.enabled() {
        debug!(
            "EDT pass along axis {axis}: {} lines of length {}, spacing {}",
            labels.len() / labels.len_of(ndarray::Axis(axis)),
            labels.len_of(ndarray::Axis(axis)),
            spacing[axis]
        );
        transform_axis(labels, dist.view_mut(), axis, spacing[axis], fov);
    }

    match dist.iter().filter(|v| v.is_infinite()).count() {
        0 => Ok(dist),
        n => Err(EdtError::Unbounded(n)),
    }
}
