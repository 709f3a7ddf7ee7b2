// 该文件是 Shanan （山南西风） 项目的一部分。
// src/label.rs - 类别标签表
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

use thiserror::Error;
use tracing::debug;

/// 标签文件的表头行，加载时跳过
pub const LABEL_HEADER: &str = "classes";

#[derive(Error, Debug)]
pub enum LabelError {
  #[error("标签文件读取错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// 按类别 ID 索引的类别名
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
  labels: Box<[String]>,
}

impl LabelTable {
  pub fn from_file(path: &Path) -> Result<Self, LabelError> {
    let text = std::fs::read_to_string(path)?;
    let table = Self::parse(&text);
    debug!("从 {} 加载了 {} 个标签", path.display(), table.len());
    Ok(table)
  }

  pub fn parse(text: &str) -> Self {
    let labels = text
      .lines()
      .map(|line| line.trim_end_matches('\r'))
      .filter(|line| *line != LABEL_HEADER)
      .map(str::to_string)
      .collect::<Vec<_>>();

    Self {
      labels: labels.into_boxed_slice(),
    }
  }

  pub fn get(&self, class_id: u32) -> Option<&str> {
    self.labels.get(class_id as usize).map(String::as_str)
  }

  /// 类别名，表中没有该 ID 时退化为数字本身
  pub fn name_of(&self, class_id: u32) -> String {
    self
      .get(class_id)
      .map(str::to_string)
      .unwrap_or_else(|| class_id.to_string())
  }

  pub fn len(&self) -> usize {
    self.labels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }
}
