// 该文件是 Shanan （山南西风） 项目的一部分。
// src/preprocess.rs - 图像预处理
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

use clap::ValueEnum;
use half::f16;
use image::{RgbImage, imageops::FilterType};
use tracing::debug;

use crate::frame::{F16NhwcTensor, RGB_CHANNELS};

/// 网络期望的通道顺序；解码得到的帧总是 RGB 顺序
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorOrder {
  Rgb,
  Bgr,
}

impl ColorOrder {
  fn arrange(self, [r, g, b]: [u8; 3]) -> [u8; 3] {
    match self {
      ColorOrder::Rgb => [r, g, b],
      ColorOrder::Bgr => [b, g, r],
    }
  }
}

/// 缩放到网络输入尺寸，按需调整通道顺序，转为半精度后减均值再乘缩放系数
pub fn preprocess(
  frame: &RgbImage,
  (width, height): (u32, u32),
  order: ColorOrder,
  mean: [f32; 3],
  scale: f32,
) -> F16NhwcTensor {
  debug!(
    "预处理: {}x{} -> {}x{}, 通道顺序 {:?}",
    frame.width(),
    frame.height(),
    width,
    height,
    order
  );
  let resized = image::imageops::resize(frame, width, height, FilterType::Triangle);

  let mean = mean.map(f16::from_f32);
  let scale = f16::from_f32(scale);

  let mut tensor = F16NhwcTensor::with_shape(height as usize, width as usize);
  let slice = tensor.as_mut();
  for (pixel, out) in resized.pixels().zip(slice.chunks_exact_mut(RGB_CHANNELS)) {
    let channels = order.arrange(pixel.0);
    for c in 0..RGB_CHANNELS {
      out[c] = (f16::from(channels[c]) - mean[c]) * scale;
    }
  }
  tensor
}
