// 该文件是 Shanan （山南西风） 项目的一部分。
// src/input.rs - 图像文件输入
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

use std::path::{Path, PathBuf};

use image::{ImageReader, RgbImage};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("Image not found: {0}")]
  NotFound(PathBuf),
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("Image loading error: {0}")]
  ImageLoadError(#[from] image::ImageError),
}

/// 已确认存在的输入图像文件
#[derive(Debug, Clone)]
pub struct ImageFileInput {
  path: PathBuf,
}

impl ImageFileInput {
  /// 只检查文件是否存在，不做解码
  pub fn locate(path: &Path) -> Result<Self, ImageFileInputError> {
    if !path.is_file() {
      return Err(ImageFileInputError::NotFound(path.to_path_buf()));
    }
    Ok(ImageFileInput {
      path: path.to_path_buf(),
    })
  }

  /// 解码为 RGB 帧
  pub fn read(&self) -> Result<RgbImage, ImageFileInputError> {
    let image = ImageReader::open(&self.path)?
      .with_guessed_format()?
      .decode()?;
    debug!(
      "读取图像 {}: {}x{}",
      self.path.display(),
      image.width(),
      image.height()
    );
    Ok(image.to_rgb8())
  }
}
