//! 以一维线为单位访问三维网格.
//!
//! 沿第 `axis` 个轴, 网格被视为若干条互不相交的线 (`ndarray` 的 lanes).
//! 每条线再被切分为标签相同的连续区间 (run), 每个区间独立地经过一次下包络变换,
//! 结果写回原位置. 同一轴上的不同线读写集合互不重叠, 因此可以放心地并行处理.

use super::envelope::LowerEnvelope;
use super::{FovBoundary, Label};
use ndarray::{s, ArrayView1, ArrayView3, ArrayViewMut1, ArrayViewMut3, Axis, Zip};

/// 一条线上标签相同的最大连续区间 `[start, stop)`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Run<T> {
    pub start: usize,
    pub stop: usize,
    pub label: T,
}

/// 按顺序迭代一条线上的所有 [`Run`].
pub(crate) struct Runs<'a, T> {
    labels: ArrayView1<'a, T>,
    cursor: usize,
}

impl<'a, T: Label> Runs<'a, T> {
    #[inline]
    pub(crate) fn new(labels: ArrayView1<'a, T>) -> Self {
        Self { labels, cursor: 0 }
    }
}

impl<T: Label> Iterator for Runs<'_, T> {
    type Item = Run<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.cursor;
        let label = *self.labels.get(start)?;
        let mut stop = start + 1;
        while self.labels.get(stop).is_some_and(|l| *l == label) {
            stop += 1;
        }
        self.cursor = stop;
        Some(Run { start, stop, label })
    }
}

/// 对一条线做一次变换.
///
/// `dist` 在调用前保存之前各轴累积的平方距离 (第一轴时全为 `+inf`), 调用后被覆写.
/// 每个区间两端各放一个高度为 0 的边界站点, 位于相邻的异标签体素上;
/// 区间碰到视野边缘时, 只有非零标签在 [`FovBoundary::Closed`]
/// 策略下才在视野外一格放置虚拟边界.
pub(crate) fn transform_line<T: Label>(
    labels: ArrayView1<T>,
    mut dist: ArrayViewMut1<f64>,
    delta: f64,
    fov: FovBoundary,
    env: &mut LowerEnvelope,
) {
    debug_assert_eq!(labels.len(), dist.len());
    let n = labels.len();

    for Run { start, stop, label } in Runs::new(labels) {
        let closed = fov.closes(label);
        env.reset(delta);

        // 站点位置相对于区间起点.
        if start > 0 || closed {
            env.push(-1.0, 0.0);
        }
        for (j, h) in dist.slice(s![start..stop]).iter().enumerate() {
            env.push(j as f64, *h);
        }
        if stop < n || closed {
            env.push((stop - start) as f64, 0.0);
        }

        env.eval_into(dist.slice_mut(s![start..stop]).iter_mut());
    }
}

/// 沿第 `axis` 个轴, 以间距 `delta` 对 `dist` 的每条线做变换.
///
/// 该函数返回时, 该轴上的所有线均已处理完毕.
pub(crate) fn transform_axis<T: Label>(
    labels: ArrayView3<T>,
    mut dist: ArrayViewMut3<f64>,
    axis: usize,
    delta: f64,
    fov: FovBoundary,
) {
    debug_assert_eq!(labels.shape(), dist.shape());
    let len = labels.len_of(Axis(axis));
    let zip = Zip::from(dist.lanes_mut(Axis(axis))).and(labels.lanes(Axis(axis)));
    dispatch_lines(zip, len, delta, fov);
}

type LineZip<'a, 'b, T> = Zip<
    (
        ndarray::iter::LanesMut<'a, f64, ndarray::Ix2>,
        ndarray::iter::Lanes<'b, T, ndarray::Ix2>,
    ),
    ndarray::Ix2,
>;

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelIterator, ParallelIterator};

        /// 借助 `rayon`, 每条线作为一个任务. 每个工作线程持有自己的下包络.
        fn dispatch_lines<T: Label>(zip: LineZip<'_, '_, T>, len: usize, delta: f64, fov: FovBoundary) {
            zip.into_par_iter().for_each_init(
                || LowerEnvelope::with_capacity(delta, len + 2),
                |env, (d, l)| transform_line(l, d, delta, fov, env),
            );
        }
    } else {
        /// 串行处理所有线, 复用同一个下包络.
        fn dispatch_lines<T: Label>(zip: LineZip<'_, '_, T>, len: usize, delta: f64, fov: FovBoundary) {
            let mut env = LowerEnvelope::with_capacity(delta, len + 2);
            zip.for_each(|d, l| transform_line(l, d, delta, fov, &mut env));
        }
    }
}
