//! 测试用的 O(N^2) 参照实现.

use super::{AxisMask, FovBoundary, Label};
use itertools::iproduct;
use ndarray::{Array3, ArrayView3};

/// 对每个体素穷举所有异标签体素 (关闭的轴上必须位于同一切片),
/// 闭合视野下非零体素再与每个打开轴上视野外一格的虚拟边界比较.
/// 找不到任何边界时为 `+inf`.
pub(crate) fn brute_force<T: Label>(
    labels: ArrayView3<T>,
    spacing: [f64; 3],
    axes: AxisMask,
    fov: FovBoundary,
) -> Array3<f64> {
    let (d0, d1, d2) = labels.dim();
    let dims = [d0, d1, d2];
    Array3::from_shape_fn(labels.raw_dim(), |(a, b, c)| {
        let here = [a, b, c];
        let label = labels[here];
        let mut best = f64::INFINITY;

        for (x, y, z) in iproduct!(0..d0, 0..d1, 0..d2) {
            let there = [x, y, z];
            if labels[there] == label {
                continue;
            }
            let mut sq = 0.0;
            let mut same_slice = true;
            for k in 0..3 {
                let diff = here[k] as f64 - there[k] as f64;
                if axes.is_enabled(k) {
                    sq += (diff * spacing[k]).powi(2);
                } else if diff != 0.0 {
                    same_slice = false;
                }
            }
            if same_slice {
                best = best.min(sq);
            }
        }

        if fov.closes(label) {
            for k in axes.enabled() {
                let steps = (here[k] + 1).min(dims[k] - here[k]) as f64;
                best = best.min((steps * spacing[k]).powi(2));
            }
        }
        best
    })
}
