//! 输出阶段: 开方, 符号, 背景抑制与掩膜.

use super::{EdtOptions, Label};
use ndarray::{Array3, ArrayView3, ArrayViewMut3, Zip};

/// 把平方距离场转换为最终输出.
///
/// `opts.squared` 为 `false` 时逐体素开方, 随后调用 [`annotate`].
pub(crate) fn apply_policy<T: Label>(
    dist2: Array3<f64>,
    labels: ArrayView3<T>,
    mask: Option<ArrayView3<bool>>,
    opts: &EdtOptions,
) -> Array3<f32> {
    let mut out = if opts.squared {
        dist2.mapv(|v| v as f32)
    } else {
        dist2.mapv(|v| v.sqrt() as f32)
    };
    annotate(out.view_mut(), labels, mask, opts);
    out
}

/// 就地为距离场加上符号, 并抑制背景与掩膜外的体素.
///
/// 依次进行:
///
/// 1. 背景体素在 `background_negative` 时取 `-|v|`,
///   非零体素在 `foreground_negative` 时取 `-|v|`;
/// 2. 背景体素在 `zero_background` 时置 0;
/// 3. `mask` 为 `false` 的体素置 0.
///
/// 重复调用不会改变结果. 掩膜只影响输出, 不参与距离计算.
///
/// # 注意
///
/// `labels` 与 `mask` 的形状必须与 `out` 一致, 否则程序 panic.
pub fn annotate<T: Label>(
    mut out: ArrayViewMut3<f32>,
    labels: ArrayView3<T>,
    mask: Option<ArrayView3<bool>>,
    opts: &EdtOptions,
) {
    Zip::from(&mut out).and(&labels).for_each(|o, l| {
        let background = l.is_zero();
        if (background && opts.background_negative) || (!background && opts.foreground_negative) {
            *o = -o.abs();
        }
        if background && opts.zero_background {
            *o = 0.0;
        }
    });

    if let Some(mask) = mask {
        Zip::from(&mut out).and(&mask).for_each(|o, inside| {
            if !*inside {
                *o = 0.0;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr3, Array3};

    fn field() -> (Array3<u8>, Array3<f64>) {
        let labels = arr3(&[[[0u8, 1, 1, 2]]]);
        let dist2 = arr3(&[[[4.0, 1.0, 9.0, 2.25]]]);
        (labels, dist2)
    }

    #[test]
    fn test_linear_is_sqrt_of_squared() {
        let (labels, dist2) = field();
        let sq = apply_policy(
            dist2.clone(),
            labels.view(),
            None,
            &EdtOptions { squared: true, ..Default::default() },
        );
        let lin = apply_policy(dist2, labels.view(), None, &EdtOptions::default());
        assert_eq!(lin, arr3(&[[[2.0f32, 1.0, 3.0, 1.5]]]));
        Zip::from(&sq).and(&lin).for_each(|s, l| assert_eq!(s.sqrt(), *l));
    }

    #[test]
    fn test_signs_and_background() {
        let (labels, dist2) = field();
        let opts = EdtOptions {
            background_negative: true,
            ..Default::default()
        };
        let out = apply_policy(dist2.clone(), labels.view(), None, &opts);
        assert_eq!(out, arr3(&[[[-2.0f32, 1.0, 3.0, 1.5]]]));

        let opts = EdtOptions {
            foreground_negative: true,
            zero_background: true,
            ..Default::default()
        };
        let out = apply_policy(dist2, labels.view(), None, &opts);
        assert_eq!(out, arr3(&[[[0.0f32, -1.0, -3.0, -1.5]]]));
    }

    #[test]
    fn test_annotate_is_idempotent() {
        let (labels, dist2) = field();
        let mask = arr3(&[[[true, true, false, true]]]);
        let opts = EdtOptions {
            background_negative: true,
            foreground_negative: true,
            ..Default::default()
        };
        let once = apply_policy(dist2, labels.view(), Some(mask.view()), &opts);
        let mut twice = once.clone();
        annotate(twice.view_mut(), labels.view(), Some(mask.view()), &opts);
        assert_eq!(once, twice);
        assert_eq!(once, arr3(&[[[-2.0f32, -1.0, 0.0, -1.5]]]));
    }
}
