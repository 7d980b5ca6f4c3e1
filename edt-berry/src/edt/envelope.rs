//! 一维抛物线下包络 (Felzenszwalb & Huttenlocher, 2012).
//!
//! 每个位置为 `p`, 高度为 `h` 的站点贡献一条抛物线 `h + ((x - p) * delta)^2`.
//! 所有抛物线的逐点最小值即一维平方距离变换. 站点必须按位置严格升序加入,
//! 此时维护下包络只需要一个单调栈, 总时间复杂度为 O(N).
//!
//! 站点位置以样本下标为单位, 但不要求是整数. 这样区域边界可以落在两个样本之间.

/// 抛物线下包络, 同时也是计算一维变换所需的全部临时空间.
///
/// 每个工作线程应持有自己的实例, 并在处理不同的线之间用 [`Self::reset`] 复用.
#[derive(Debug, Clone)]
pub struct LowerEnvelope {
    /// 样本间距 (物理单位).
    delta: f64,

    /// 栈中抛物线的顶点位置 (样本下标单位), 严格升序.
    sites: Vec<f64>,

    /// 栈中抛物线的顶点高度.
    heights: Vec<f64>,

    /// `bounds[k]` 是第 `k` 条抛物线在下包络上开始起效的位置 (物理单位).
    /// 第一条抛物线总是 `-inf`.
    bounds: Vec<f64>,
}

impl LowerEnvelope {
    /// 以样本间距 `delta` 创建空的下包络.
    ///
    /// `delta` 必须为有限正数, 否则程序 panic.
    pub fn new(delta: f64) -> Self {
        Self::with_capacity(delta, 0)
    }

    /// 以样本间距 `delta` 创建空的下包络, 并预留 `capacity` 条抛物线的空间.
    pub fn with_capacity(delta: f64, capacity: usize) -> Self {
        assert!(delta.is_finite() && delta > 0.0, "样本间距 `{delta}` 非法");
        Self {
            delta,
            sites: Vec::with_capacity(capacity),
            heights: Vec::with_capacity(capacity),
            bounds: Vec::with_capacity(capacity),
        }
    }

    /// 清空所有抛物线并改用新的样本间距. 不释放已分配的空间.
    pub fn reset(&mut self, delta: f64) {
        assert!(delta.is_finite() && delta > 0.0, "样本间距 `{delta}` 非法");
        self.delta = delta;
        self.sites.clear();
        self.heights.clear();
        self.bounds.clear();
    }

    /// 样本间距.
    #[inline]
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// 当前下包络上的抛物线个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// 下包络是否为空 (即处处为 `+inf`)?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// 加入一条顶点在 `site`, 高度为 `height` 的抛物线.
    ///
    /// `site` 必须严格大于之前加入的所有站点. 高度不是有限值的站点不可能出现在
    /// 下包络上, 会被直接忽略.
    pub fn push(&mut self, site: f64, height: f64) {
        if !height.is_finite() {
            return;
        }
        debug_assert!(self.sites.last().map_or(true, |&last| last < site));

        while let Some(k) = self.sites.len().checked_sub(1) {
            let s = self.crossing(k, site, height);
            if s > self.bounds[k] {
                self.sites.push(site);
                self.heights.push(height);
                self.bounds.push(s);
                return;
            }
            // 新抛物线在第 `k` 条抛物线的整个有效区间上都更低.
            self.sites.pop();
            self.heights.pop();
            self.bounds.pop();
        }
        self.sites.push(site);
        self.heights.push(height);
        self.bounds.push(f64::NEG_INFINITY);
    }

    /// 第 `k` 条抛物线与 `(site, height)` 抛物线交点的物理坐标.
    ///
    /// 展开 `(site * d)^2 - (p * d)^2` 会在下标很大时损失精度,
    /// 因此按因式分解后的形式计算.
    #[inline]
    fn crossing(&self, k: usize, site: f64, height: f64) -> f64 {
        let (p, h) = (self.sites[k], self.heights[k]);
        let d = self.delta;
        (height - h) / (2.0 * d * (site - p)) + 0.5 * d * (site + p)
    }

    /// 在样本位置 `0, 1, 2, ...` 上依次求值, 写入 `out`.
    ///
    /// 两条抛物线恰好在某个样本处相交时, 取左侧 (较早加入的) 站点;
    /// 两者在该处的值相同, 结果与选择无关.
    /// 如果下包络为空, 则所有输出均为 `+inf`.
    pub fn eval_into<'a, I>(&self, out: I)
    where
        I: IntoIterator<Item = &'a mut f64>,
    {
        if self.is_empty() {
            out.into_iter().for_each(|o| *o = f64::INFINITY);
            return;
        }

        let mut k = 0usize;
        for (q, o) in out.into_iter().enumerate() {
            let x = q as f64 * self.delta;
            while k + 1 < self.len() && self.bounds[k + 1] < x {
                k += 1;
            }
            let d = (q as f64 - self.sites[k]) * self.delta;
            *o = self.heights[k] + d * d;
        }
    }
}

/// 采样函数 `f` 的一维平方距离变换:
/// `out[i] = min_j ( f[j] + ((i - j) * delta)^2 )`.
///
/// `f` 中的 `+inf` 表示该样本不提供任何候选.
pub fn squared_edt_1d(f: &[f64], delta: f64) -> Vec<f64> {
    let mut env = LowerEnvelope::with_capacity(delta, f.len());
    for (j, h) in f.iter().enumerate() {
        env.push(j as f64, *h);
    }
    let mut out = vec![0.0; f.len()];
    env.eval_into(out.iter_mut());
    out
}

#[cfg(test)]
mod tests {
    use super::{squared_edt_1d, LowerEnvelope};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// O(N^2) 参照实现.
    fn brute_force(f: &[f64], delta: f64) -> Vec<f64> {
        (0..f.len())
            .map(|i| {
                f.iter()
                    .enumerate()
                    .map(|(j, h)| h + ((i as f64 - j as f64) * delta).powi(2))
                    .fold(f64::INFINITY, f64::min)
            })
            .collect()
    }

    fn assert_close(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            if x.is_infinite() || y.is_infinite() {
                assert_eq!(x, y);
            } else {
                assert!((x - y).abs() <= 1e-9 * (1.0 + y.abs()), "{a:?} != {b:?}");
            }
        }
    }

    /// 边界位于 2.5 与 5.5 (标签 `[1, 1, 1, 0, 0, 0, 1, 1]`), 视野边缘开放.
    #[test]
    fn test_half_index_boundaries() {
        let mut env = LowerEnvelope::new(1.0);
        env.push(2.5, 0.0);
        env.push(5.5, 0.0);
        let mut out = [0.0; 8];
        env.eval_into(out.iter_mut());
        assert_eq!(out, [6.25, 2.25, 0.25, 0.25, 2.25, 0.25, 0.25, 2.25]);
    }

    #[test]
    fn test_single_sample() {
        assert_eq!(squared_edt_1d(&[3.5], 0.7), vec![3.5]);
        assert_eq!(squared_edt_1d(&[f64::INFINITY], 1.0), vec![f64::INFINITY]);
        assert!(squared_edt_1d(&[], 1.0).is_empty());
    }

    #[test]
    fn test_all_infinite() {
        let f = [f64::INFINITY; 5];
        assert!(squared_edt_1d(&f, 2.0).iter().all(|v| v.is_infinite()));
    }

    /// 只有左端一个边界时, 距离随位置单调增长.
    #[test]
    fn test_one_sided_growth() {
        let mut env = LowerEnvelope::new(0.5);
        env.push(-1.0, 0.0);
        let mut out = [0.0; 6];
        env.eval_into(out.iter_mut());
        for (q, v) in out.iter().enumerate() {
            assert_eq!(*v, ((q as f64 + 1.0) * 0.5).powi(2));
        }
        assert!(out.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_against_brute_force() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..300 {
            let n = rng.random_range(1..40);
            let delta = rng.random_range(0.2..3.0);
            let f: Vec<f64> = (0..n)
                .map(|_| {
                    if rng.random_bool(0.3) {
                        f64::INFINITY
                    } else {
                        rng.random_range(0.0..50.0)
                    }
                })
                .collect();
            assert_close(&squared_edt_1d(&f, delta), &brute_force(&f, delta));
        }
    }

    /// 大下标下交点计算不能因抵消而失真.
    #[test]
    fn test_large_indices() {
        let n = 200_000;
        let mut f = vec![f64::INFINITY; n];
        f[n - 3] = 0.0;
        f[n - 1] = 0.0;
        let out = squared_edt_1d(&f, 0.9);
        assert!((out[n - 2] - 0.81).abs() < 1e-12);
        assert!((out[0] - ((n - 3) as f64 * 0.9).powi(2)).abs() < 1e-3);
    }

    #[test]
    fn test_reset_reuses_envelope() {
        let mut env = LowerEnvelope::with_capacity(1.0, 4);
        env.push(0.0, 0.0);
        env.push(1.0, 0.0);
        assert_eq!(env.len(), 2);
        env.reset(2.0);
        assert!(env.is_empty());
        assert_eq!(env.delta(), 2.0);
        env.push(3.0, 1.0);
        let mut out = [0.0; 4];
        env.eval_into(out.iter_mut());
        assert_eq!(out, [37.0, 17.0, 5.0, 1.0]);
    }
}
