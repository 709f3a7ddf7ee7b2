// 该文件是 Shanan （山南西风） 项目的一部分。
// src/frame.rs - NHWC 半精度张量定义
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

use half::f16;

pub const RGB_CHANNELS: usize = 3;

/// 批大小为 1 的 NHWC 半精度输入张量
#[derive(Debug, Clone, PartialEq)]
pub struct F16NhwcTensor {
  height: usize,
  width: usize,
  data: Box<[f16]>,
}

impl F16NhwcTensor {
  pub fn with_shape(height: usize, width: usize) -> Self {
    let size = RGB_CHANNELS * height * width;
    Self {
      height,
      width,
      data: vec![f16::ZERO; size].into_boxed_slice(),
    }
  }

  pub fn height(&self) -> usize {
    self.height
  }

  pub fn width(&self) -> usize {
    self.width
  }

  pub fn channels(&self) -> usize {
    RGB_CHANNELS
  }

  pub fn shape(&self) -> [usize; 4] {
    [1, self.height, self.width, RGB_CHANNELS]
  }

  pub fn get(&self, y: usize, x: usize, c: usize) -> f16 {
    self.data[(y * self.width + x) * RGB_CHANNELS + c]
  }

  pub fn as_nhwc(&self) -> &[f16] {
    &self.data
  }

  /// 驱动所需的小端字节序
  pub fn to_le_bytes(&self) -> Vec<u8> {
    self.data.iter().flat_map(|v| v.to_le_bytes()).collect()
  }
}

impl AsMut<[f16]> for F16NhwcTensor {
  fn as_mut(&mut self) -> &mut [f16] {
    &mut self.data
  }
}
