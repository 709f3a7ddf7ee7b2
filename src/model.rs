// 该文件是 Shanan （山南西风） 项目的一部分。
// src/model.rs - 模型
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
use tracing::{debug, info};

use crate::{
  device::{Accelerator, OutputTensor, Session, SessionError},
  frame::F16NhwcTensor,
};

mod ssd;
pub use self::ssd::{DecodeError, MAX_DETECTIONS, SSD_RECORD_LEN, decode};

/// VOC 类别中的 "person"
pub const CLASS_PERSON: u32 = 15;

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
  fn postprocess(output: &OutputTensor) -> Result<Self::Output, Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
  pub class_id: u32,
  pub score: f32,
  pub bbox: [f32; 4], // [y_min, x_min, y_max, x_max]
}

impl Detection {
  pub fn is_finite(&self) -> bool {
    self.score.is_finite() && self.bbox.iter().all(|v| v.is_finite())
  }

  /// 有效且置信度达到阈值，与类别无关
  pub fn passes(&self, threshold: f32) -> bool {
    self.is_finite() && self.score >= threshold
  }

  /// 整数百分比，截断小数部分
  pub fn score_percent(&self) -> u32 {
    (self.score * 100.0) as u32
  }

  /// 像素坐标 (x_min, y_min, x_max, y_max)，限制在图像范围内
  pub fn pixel_box(&self, width: u32, height: u32) -> (i32, i32, i32, i32) {
    let (w, h) = (width as f32, height as f32);
    let max_x = width.saturating_sub(1) as i32;
    let max_y = height.saturating_sub(1) as i32;

    let y_min = ((self.bbox[0] * h) as i32).clamp(0, max_y);
    let x_min = ((self.bbox[1] * w) as i32).clamp(0, max_x);
    let y_max = ((self.bbox[2] * h) as i32).clamp(0, max_y);
    let x_max = ((self.bbox[3] * w) as i32).clamp(0, max_x);
    (x_min, y_min, x_max, y_max)
  }
}

#[derive(Debug, Clone, Default)]
pub struct DetectResult {
  pub items: Box<[Detection]>,
}

#[derive(Error, Debug)]
pub enum ModelError {
  #[error("推理错误: {0}")]
  SessionError(#[from] SessionError),
  #[error("输出解析错误: {0}")]
  DecodeError(#[from] DecodeError),
}

/// 运行在加速器会话上的 SSD MobileNet 检测网络
pub struct SsdMobileNet<'s, 'a, A: Accelerator> {
  session: &'s Session<'a, A>,
}

impl<'s, 'a, A: Accelerator> SsdMobileNet<'s, 'a, A> {
  pub fn new(session: &'s Session<'a, A>) -> Self {
    Self { session }
  }
}

impl<A: Accelerator> Model for SsdMobileNet<'_, '_, A> {
  type Input = F16NhwcTensor;
  type Output = DetectResult;
  type Error = ModelError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    debug!("提交输入张量 {:?}", input.shape());
    let (output, elapsed) = self.session.infer(input)?;
    info!("推理完成，设备耗时: {:.2?}", elapsed);
    Self::postprocess(&output)
  }

  fn postprocess(output: &OutputTensor) -> Result<Self::Output, Self::Error> {
    debug!("输出张量: {} 个 {:?} 元素", output.len(), output.element_type());
    let items = decode(output)?;
    debug!("检测到 {} 个物体", items.len());
    debug!("检测结果: {:?}", items);
    Ok(DetectResult {
      items: items.into_boxed_slice(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn detection(bbox: [f32; 4]) -> Detection {
    Detection {
      class_id: CLASS_PERSON,
      score: 0.857,
      bbox,
    }
  }

  #[test]
  fn pixel_box_scales_normalized_corners() {
    let det = detection([0.25, 0.1, 0.75, 0.5]);
    assert_eq!(det.pixel_box(200, 100), (20, 25, 100, 75));
  }

  #[test]
  fn pixel_box_is_clamped_to_frame() {
    let det = detection([-0.2, -1.0, 1.3, 2.0]);
    assert_eq!(det.pixel_box(64, 48), (0, 0, 63, 47));
  }

  #[test]
  fn score_percent_truncates() {
    assert_eq!(detection([0.0; 4]).score_percent(), 85);
  }

  #[test]
  fn non_finite_fields_are_detected() {
    assert!(detection([0.0, 0.0, 1.0, 1.0]).is_finite());
    assert!(!detection([f32::NAN, 0.0, 1.0, 1.0]).is_finite());
    let mut det = detection([0.0; 4]);
    det.score = f32::INFINITY;
    assert!(!det.is_finite());
  }

  #[test]
  fn postprocess_decodes_ssd_output() {
    let output = OutputTensor::from_f32(&[
      1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, //
      0.0, 15.0, 0.9, 0.1, 0.2, 0.3, 0.4,
    ]);
    let result = SsdMobileNet::<crate::device::Unavailable>::postprocess(&output).unwrap();
    assert_eq!(result.items.len(), 1);
    assert_eq!(result.items[0].class_id, CLASS_PERSON);
  }
}
