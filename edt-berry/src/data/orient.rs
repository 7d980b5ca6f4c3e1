//! 从 nifti header 推断数据方向.

use crate::edt::{AnatomicalAxis, ConfigError, Orientation};
use nifti::NiftiHeader;

/// 体素坐标到 RAS+ 世界坐标的 3x3 线性部分, 按 nifti 的 `(i, j, k)` 列排列.
type Affine3 = [[f64; 3]; 3];

/// 由 header 推断数组三个轴 (`ndarray` 顺序, 即 `[k, j, i]`) 的解剖方向.
///
/// 优先使用 sform (`sform_code > 0`), 其次使用 qform 四元数 (`qform_code > 0`),
/// 都没有时按单位矩阵处理. 每个体素轴由其方向向量中绝对值最大的分量决定.
///
/// # 返回值
///
/// 如果两个体素轴落在同一个世界轴上 (例如 45 度斜切), 返回
/// `Err(ConfigError::UnresolvedOrientation)`.
pub fn orientation_from_header(header: &NiftiHeader) -> Result<Orientation, ConfigError> {
    let m = if header.sform_code > 0 {
        sform_matrix(header)
    } else if header.qform_code > 0 {
        qform_matrix(header)
    } else {
        [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
    };

    let mut axes = [AnatomicalAxis::LeftRight; 3];
    for (col, ax) in axes.iter_mut().enumerate() {
        *ax = dominant_axis(&m, col).ok_or(ConfigError::UnresolvedOrientation)?;
    }
    // nifti (i, j, k) -> ndarray (k, j, i).
    axes.reverse();
    Orientation::new(axes)
}

fn sform_matrix(header: &NiftiHeader) -> Affine3 {
    let rows = [header.srow_x, header.srow_y, header.srow_z];
    let mut m = [[0.0; 3]; 3];
    for (r, row) in rows.iter().enumerate() {
        for c in 0..3 {
            m[r][c] = row[c] as f64;
        }
    }
    m
}

/// nifti 标准的四元数旋转矩阵. `pixdim[0] < 0` 时第三列取反.
fn qform_matrix(header: &NiftiHeader) -> Affine3 {
    let (b, c, d) = (
        header.quatern_b as f64,
        header.quatern_c as f64,
        header.quatern_d as f64,
    );
    let a = (1.0 - (b * b + c * c + d * d)).max(0.0).sqrt();
    let qfac = if header.pixdim[0] < 0.0 { -1.0 } else { 1.0 };

    [
        [
            a * a + b * b - c * c - d * d,
            2.0 * (b * c - a * d),
            2.0 * (b * d + a * c) * qfac,
        ],
        [
            2.0 * (b * c + a * d),
            a * a + c * c - b * b - d * d,
            2.0 * (c * d - a * b) * qfac,
        ],
        [
            2.0 * (b * d - a * c),
            2.0 * (c * d + a * b),
            (a * a + d * d - c * c - b * b) * qfac,
        ],
    ]
}

/// 第 `col` 列方向向量中绝对值最大的分量对应的解剖轴. 零向量返回 `None`.
fn dominant_axis(m: &Affine3, col: usize) -> Option<AnatomicalAxis> {
    let (index, value) = (0..3)
        .map(|r| (r, m[r][col].abs()))
        .fold((0, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best });
    if value > 0.0 {
        AnatomicalAxis::from_world_index(index)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AnatomicalAxis::*;

    fn axes(o: Orientation) -> [AnatomicalAxis; 3] {
        [o.axis(0), o.axis(1), o.axis(2)]
    }

    #[test]
    fn test_identity_without_codes() {
        let header = NiftiHeader::default();
        let o = orientation_from_header(&NiftiHeader {
            sform_code: 0,
            qform_code: 0,
            ..header
        })
        .unwrap();
        assert_eq!(axes(o), [InferiorSuperior, PosteriorAnterior, LeftRight]);
    }

    #[test]
    fn test_sform_permutation() {
        let header = NiftiHeader {
            sform_code: 1,
            qform_code: 0,
            srow_x: [0.0, 0.0, 2.0, 10.0],
            srow_y: [0.0, -1.0, 0.0, 0.0],
            srow_z: [3.0, 0.0, 0.0, -5.0],
            ..Default::default()
        };
        let o = orientation_from_header(&header).unwrap();
        assert_eq!(axes(o), [LeftRight, PosteriorAnterior, InferiorSuperior]);
    }

    #[test]
    fn test_qform_rotation() {
        // 绕 x 轴旋转 90 度: j -> z, k -> -y.
        let h = std::f32::consts::FRAC_1_SQRT_2;
        let header = NiftiHeader {
            sform_code: 0,
            qform_code: 1,
            quatern_b: h,
            quatern_c: 0.0,
            quatern_d: 0.0,
            ..Default::default()
        };
        let o = orientation_from_header(&header).unwrap();
        assert_eq!(axes(o), [PosteriorAnterior, InferiorSuperior, LeftRight]);

        // 绕 z 轴旋转 180 度, 轴不变.
        let header = NiftiHeader {
            sform_code: 0,
            qform_code: 2,
            quatern_b: 0.0,
            quatern_c: 0.0,
            quatern_d: 1.0,
            ..Default::default()
        };
        let o = orientation_from_header(&header).unwrap();
        assert_eq!(axes(o), [InferiorSuperior, PosteriorAnterior, LeftRight]);
    }

    #[test]
    fn test_oblique_is_unresolved() {
        let header = NiftiHeader {
            sform_code: 1,
            srow_x: [1.0, 0.0, 0.0, 0.0],
            srow_y: [0.0, 0.0, 0.0, 0.0],
            srow_z: [0.0, 0.0, 1.0, 0.0],
            ..Default::default()
        };
        assert_eq!(
            orientation_from_header(&header),
            Err(ConfigError::UnresolvedOrientation)
        );

        let header = NiftiHeader {
            sform_code: 1,
            srow_x: [1.0, 2.0, 0.0, 0.0],
            srow_y: [0.0, 0.5, 0.0, 0.0],
            srow_z: [0.0, 0.0, 1.0, 0.0],
            ..Default::default()
        };
        assert_eq!(
            orientation_from_header(&header),
            Err(ConfigError::UnresolvedOrientation)
        );
    }
}
