// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output/draw.rs - 目标检测结果可视化
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

use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::{
  drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size},
  rect::Rect,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::Detection;

const BOX_THICKNESS: i32 = 4;
const BOX_COLOR: [u8; 3] = [0, 255, 255]; // 青色
const LABEL_FONT_SIZE: f32 = 20.0;
const LABEL_TEXT_HEIGHT: i32 = 24;
const LABEL_CHAR_WIDTH: f32 = 11.0; // 每字符平均宽度（粗略估计）
const LABEL_TEXT_VERTICAL_PADDING: i32 = 2;
const LABEL_TEXT_COLOR: [u8; 3] = [0, 0, 0];

/// 未指定 `--font` 时依次尝试的系统字体
pub const SYSTEM_FONT_PATHS: &[&str] = &[
  "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
  "/usr/share/fonts/dejavu/DejaVuSans.ttf",
  "/usr/share/fonts/TTF/DejaVuSans.ttf",
  "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
  "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
  "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
  "/usr/share/fonts/noto/NotoSans-Regular.ttf",
  "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
];

#[derive(Error, Debug)]
pub enum DrawError {
  #[error("字体文件读取错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("字体无效: {0}")]
  InvalidFont(#[from] ab_glyph::InvalidFont),
}

pub struct Draw {
  font: Option<FontVec>,
  font_size: f32,
  box_thickness: i32,
  box_color: [u8; 3],
  text_color: [u8; 3],
}

impl Default for Draw {
  fn default() -> Self {
    Self {
      font: None,
      font_size: LABEL_FONT_SIZE,
      box_thickness: BOX_THICKNESS,
      box_color: BOX_COLOR,
      text_color: LABEL_TEXT_COLOR,
    }
  }
}

impl Draw {
  pub fn with_font_file(path: &Path) -> Result<Self, DrawError> {
    let data = std::fs::read(path)?;
    let font = FontVec::try_from_vec(data)?;
    debug!("加载标签字体: {}", path.display());
    Ok(Self {
      font: Some(font),
      ..Default::default()
    })
  }

  /// 指定的字体必须可用；未指定时回退到系统字体
  pub fn from_font(path: Option<&Path>) -> Result<Self, DrawError> {
    match path {
      Some(path) => Self::with_font_file(path),
      None => Ok(Self::with_system_font(SYSTEM_FONT_PATHS)),
    }
  }

  /// 使用候选列表中第一个可加载的字体，全部失败时不带字体
  pub fn with_system_font<P: AsRef<Path>>(candidates: &[P]) -> Self {
    for candidate in candidates {
      let path = candidate.as_ref();
      if !path.is_file() {
        continue;
      }
      match Self::with_font_file(path) {
        Ok(draw) => return draw,
        Err(err) => warn!("系统字体 {} 不可用: {}", path.display(), err),
      }
    }
    Self::default()
  }

  pub fn has_font(&self) -> bool {
    self.font.is_some()
  }

  /// 在图像上绘制边框，并在其上方绘制 `label` 文本
  pub fn draw_bbox_with_label(&self, image: &mut RgbImage, detection: &Detection, label: &str) {
    let (x_min, y_min, x_max, y_max) = detection.pixel_box(image.width(), image.height());
    if x_min >= x_max || y_min >= y_max {
      debug!("边框退化，跳过绘制: {:?}", detection.bbox);
      return;
    }

    for t in 0..self.box_thickness {
      let width = x_max - x_min + 1 - 2 * t;
      let height = y_max - y_min + 1 - 2 * t;
      if width <= 0 || height <= 0 {
        break;
      }
      let rect = Rect::at(x_min + t, y_min + t).of_size(width as u32, height as u32);
      draw_hollow_rect_mut(image, rect, Rgb(self.box_color));
    }

    let scale = PxScale::from(self.font_size);
    let (text_width, text_height) = match &self.font {
      Some(font) => {
        let (w, h) = text_size(scale, font, label);
        (w as i32, h as i32)
      }
      None => (
        (label.chars().count() as f32 * LABEL_CHAR_WIDTH) as i32,
        LABEL_TEXT_HEIGHT,
      ),
    };
    let label_height = text_height + 2 * LABEL_TEXT_VERTICAL_PADDING;
    let label_y = (y_min - label_height).max(0);
    let label_width = text_width.min(image.width() as i32 - x_min);
    if label_width <= 0 || label_height <= 0 {
      return;
    }

    // 无字体时只保留标签底色
    let rect = Rect::at(x_min, label_y).of_size(label_width as u32, label_height as u32);
    draw_filled_rect_mut(image, rect, Rgb(self.box_color));
    if let Some(font) = &self.font {
      draw_text_mut(
        image,
        Rgb(self.text_color),
        x_min,
        label_y + LABEL_TEXT_VERTICAL_PADDING,
        scale,
        font,
        label,
      );
    }
  }
}

/// 标注文本，例如 `person: 85%`
pub fn display_label(name: &str, detection: &Detection) -> String {
  format!("{}: {}%", name, detection.score_percent())
}
