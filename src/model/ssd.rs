// 该文件是 Shanan （山南西风） 项目的一部分。
// src/model/ssd.rs - SSD 检测输出解析
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use thiserror::Error;
use tracing::debug;

use crate::{device::OutputTensor, model::Detection};

/// 每条记录的元素个数：[image_id, class_id, score, x_min, y_min, x_max, y_max]
pub const SSD_RECORD_LEN: usize = 7;
/// 网络单次输出的检测数上限
pub const MAX_DETECTIONS: usize = 100;

const COUNT_OFFSET: usize = 0;
const CLASS_OFFSET: usize = 1;
const SCORE_OFFSET: usize = 2;
const X_MIN_OFFSET: usize = 3;
const Y_MIN_OFFSET: usize = 4;
const X_MAX_OFFSET: usize = 5;
const Y_MAX_OFFSET: usize = 6;

#[derive(Error, Debug, PartialEq)]
pub enum DecodeError {
  #[error("输出张量为空")]
  Empty,
  #[error("检测数量无效: {0}")]
  InvalidCount(f32),
  #[error("检测数量 {0} 超过上限 {max}", max = MAX_DETECTIONS)]
  TooManyDetections(usize),
  #[error("输出张量被截断: 需要 {expected} 个元素, 实际为 {actual}")]
  Truncated { expected: usize, actual: usize },
}

/// 解析 SSD 检测输出。
///
/// 第 0 条记录是表头，首个元素为检测数量；其后第 `i + 1` 条记录对应第 `i` 个检测。
/// 只解析表头声明数量的记录，之后的内容忽略。
pub fn decode(output: &OutputTensor) -> Result<Vec<Detection>, DecodeError> {
  let count = output.get(COUNT_OFFSET).ok_or(DecodeError::Empty)?;
  if !count.is_finite() || count < 0.0 {
    return Err(DecodeError::InvalidCount(count));
  }
  let count = count as usize;
  if count > MAX_DETECTIONS {
    return Err(DecodeError::TooManyDetections(count));
  }

  let expected = (count + 1) * SSD_RECORD_LEN;
  if output.len() < expected {
    return Err(DecodeError::Truncated {
      expected,
      actual: output.len(),
    });
  }
  debug!("SSD 输出声明 {} 个检测", count);

  let detections = (1..=count)
    .map(|record| {
      let base = record * SSD_RECORD_LEN;
      let field = |offset: usize| output.get(base + offset).unwrap_or(f32::NAN);
      Detection {
        class_id: field(CLASS_OFFSET) as u32,
        score: field(SCORE_OFFSET),
        bbox: [
          field(Y_MIN_OFFSET),
          field(X_MIN_OFFSET),
          field(Y_MAX_OFFSET),
          field(X_MAX_OFFSET),
        ],
      }
    })
    .collect();

  Ok(detections)
}

#[cfg(test)]
mod tests {
  use half::f16;

  use super::*;
  use crate::device::ElementType;

  /// 按字节偏移写入半精度值
  fn put(buf: &mut [u8], offset: usize, value: f32) {
    buf[offset..offset + 2].copy_from_slice(&f16::from_f32(value).to_le_bytes());
  }

  #[test]
  fn half_precision_byte_offsets() {
    // 表头 14 字节，随后每条检测 14 字节
    let mut buf = vec![0u8; 14 * 3];
    put(&mut buf, 0, 2.0);

    put(&mut buf, 14, 0.0);
    put(&mut buf, 16, 15.0);
    put(&mut buf, 18, 0.875);
    put(&mut buf, 20, 0.125);
    put(&mut buf, 22, 0.25);
    put(&mut buf, 24, 0.5);
    put(&mut buf, 26, 0.75);

    put(&mut buf, 30, 3.0);
    put(&mut buf, 32, 0.5);
    put(&mut buf, 34, 0.0);
    put(&mut buf, 36, 0.0);
    put(&mut buf, 38, 1.0);
    put(&mut buf, 40, 1.0);

    let detections = decode(&OutputTensor::new(ElementType::Float16, buf)).unwrap();

    assert_eq!(
      detections,
      vec![
        Detection {
          class_id: 15,
          score: 0.875,
          bbox: [0.25, 0.125, 0.75, 0.5],
        },
        Detection {
          class_id: 3,
          score: 0.5,
          bbox: [0.0, 0.0, 1.0, 1.0],
        },
      ]
    );
  }

  #[test]
  fn single_precision_records() {
    let output = OutputTensor::from_f32(&[
      1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, //
      0.0, 7.0, 0.25, 0.5, 0.125, 0.75, 0.625,
    ]);
    let detections = decode(&output).unwrap();
    assert_eq!(
      detections,
      vec![Detection {
        class_id: 7,
        score: 0.25,
        bbox: [0.125, 0.5, 0.625, 0.75],
      }]
    );
  }

  #[test]
  fn zero_count_ignores_trailing_garbage() {
    let mut buf = vec![0xAB; 14 * 101];
    put(&mut buf, 0, 0.0);

    let detections = decode(&OutputTensor::new(ElementType::Float16, buf)).unwrap();
    assert!(detections.is_empty());
  }

  #[test]
  fn records_past_count_are_ignored() {
    let mut buf = vec![0u8; 14 * 4];
    put(&mut buf, 0, 1.0);
    put(&mut buf, 16, 15.0);
    put(&mut buf, 30, 9.0);
    put(&mut buf, 44, 12.0);

    let detections = decode(&OutputTensor::new(ElementType::Float16, buf)).unwrap();
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].class_id, 15);
  }

  #[test]
  fn header_only_buffer_with_zero_count() {
    let output = OutputTensor::from_f32(&[0.0; SSD_RECORD_LEN]);
    assert_eq!(decode(&output), Ok(Vec::new()));
  }

  #[test]
  fn empty_buffer_is_rejected() {
    let output = OutputTensor::new(ElementType::Float16, vec![0x00]);
    assert_eq!(decode(&output), Err(DecodeError::Empty));
  }

  #[test]
  fn count_beyond_buffer_is_truncated() {
    let mut buf = vec![0u8; 14 * 2];
    put(&mut buf, 0, 3.0);

    assert_eq!(
      decode(&OutputTensor::new(ElementType::Float16, buf)),
      Err(DecodeError::Truncated {
        expected: 28,
        actual: 14,
      })
    );
  }

  #[test]
  fn invalid_counts_are_rejected() {
    let nan = OutputTensor::from_f32(&[f32::NAN; SSD_RECORD_LEN]);
    assert!(matches!(decode(&nan), Err(DecodeError::InvalidCount(_))));

    let negative = OutputTensor::from_f32(&[-1.0; SSD_RECORD_LEN]);
    assert_eq!(decode(&negative), Err(DecodeError::InvalidCount(-1.0)));

    let mut huge = vec![0.0f32; SSD_RECORD_LEN * 102];
    huge[0] = 101.0;
    assert_eq!(
      decode(&OutputTensor::from_f32(&huge)),
      Err(DecodeError::TooManyDetections(101))
    );
  }
}
