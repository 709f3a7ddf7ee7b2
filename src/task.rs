// 该文件是 Shanan （山南西风） 项目的一部分。
// src/task.rs - 单次检测任务
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

use std::process::ExitCode;

use anyhow::Context as _;
use chrono::Local;
use clap::ValueEnum;
use tracing::{debug, error, info, warn};

use crate::{
  config::Config,
  device::{Accelerator, Session, SessionError},
  input::ImageFileInput,
  label::LabelTable,
  model::{CLASS_PERSON, Detection, Model, SsdMobileNet},
  output::{CaptureOutput, Draw, draw::display_label},
  preprocess::preprocess,
};

/// 一次运行的结果，对应进程退出码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Outcome {
  NoMatch = 0,
  ImageNotFound = 1,
  Detected = 2,
  NoDevice = 3,
}

impl Outcome {
  pub fn code(self) -> u8 {
    self as u8
  }
}

impl From<Outcome> for ExitCode {
  fn from(outcome: Outcome) -> Self {
    ExitCode::from(outcome.code())
  }
}

/// 多个检测结果如何折叠为最终退出码
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitPolicy {
  /// 任一检测命中即为命中
  #[default]
  Any,
  /// 只看最后一个检测
  Last,
}

impl ExitPolicy {
  pub fn fold(self, found: bool, matched: bool) -> bool {
    match self {
      ExitPolicy::Any => found || matched,
      ExitPolicy::Last => matched,
    }
  }
}

pub fn is_target(detection: &Detection, threshold: f32) -> bool {
  detection.class_id == CLASS_PERSON && detection.passes(threshold)
}

/// 执行一次完整的检测流程。
///
/// 输入图像不存在时直接返回，不会探测加速器；没有设备时不会读取图文件。
/// 会话在所有返回路径上都会被释放。
pub fn run<A: Accelerator>(config: &Config, accelerator: &A) -> anyhow::Result<Outcome> {
  let input = match ImageFileInput::locate(&config.image) {
    Ok(input) => input,
    Err(err) => {
      error!("Image not found. ({})", err);
      return Ok(Outcome::ImageNotFound);
    }
  };

  if config.threshold_modified() {
    info!("Confidence threshold modified to {}.", config.threshold_percent);
  }
  debug!("视频设备编号: {}（未使用）", config.video);

  let labels = LabelTable::from_file(&config.labels)
    .with_context(|| format!("无法加载标签文件 {}", config.labels.display()))?;
  let draw = Draw::from_font(config.font.as_deref())?;
  if !draw.has_font() {
    warn!("未找到可用字体，标签只绘制底色");
  }

  let mut session = match Session::open(accelerator, &config.graph) {
    Ok(session) => session,
    Err(SessionError::NoDevice) => {
      error!("No accelerator devices found");
      return Ok(Outcome::NoDevice);
    }
    Err(err) => return Err(anyhow::Error::from(err).context("无法打开加速器会话")),
  };

  let mut frame = input.read()?;
  let tensor = preprocess(
    &frame,
    config.dims,
    config.color_order,
    config.mean,
    config.scale,
  );

  info!("开始推理...");
  let result = SsdMobileNet::new(&session).infer(&tensor)?;
  session.close()?;

  let threshold = config.threshold();
  let mut found = false;
  let mut annotated = false;
  for detection in result.items.iter() {
    debug!("检测类别: {}", detection.class_id);
    // 低于阈值或无效的记录不参与折叠，`last` 策略只看最后一个有效记录
    if !detection.passes(threshold) {
      continue;
    }
    let matched = is_target(detection, threshold);
    if matched {
      let now = Local::now().format("%Y_%m_%d_%H_%M_%S");
      warn!("Person detected on {}", now);
      let label = display_label(&labels.name_of(detection.class_id), detection);
      info!("{} at {:?}", label, detection.bbox);
      draw.draw_bbox_with_label(&mut frame, detection, &label);
      annotated = true;
    }
    found = config.exit_policy.fold(found, matched);
  }

  if annotated {
    CaptureOutput::from_config(config).save(&frame)?;
  }

  Ok(if found {
    Outcome::Detected
  } else {
    Outcome::NoMatch
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn detection(class_id: u32, score: f32) -> Detection {
    Detection {
      class_id,
      score,
      bbox: [0.1, 0.1, 0.9, 0.9],
    }
  }

  #[test]
  fn outcome_codes() {
    assert_eq!(Outcome::NoMatch.code(), 0);
    assert_eq!(Outcome::ImageNotFound.code(), 1);
    assert_eq!(Outcome::Detected.code(), 2);
    assert_eq!(Outcome::NoDevice.code(), 3);
  }

  #[test]
  fn target_requires_person_at_threshold() {
    assert!(is_target(&detection(15, 0.6), 0.6));
    assert!(is_target(&detection(15, 0.85), 0.6));
    assert!(!is_target(&detection(15, 0.4), 0.6));
    assert!(!is_target(&detection(3, 0.99), 0.6));
    assert!(!is_target(&detection(15, f32::NAN), 0.0));
  }

  #[test]
  fn any_policy_remembers_earlier_match() {
    let folded = [true, false]
      .into_iter()
      .fold(false, |found, matched| ExitPolicy::Any.fold(found, matched));
    assert!(folded);
  }

  #[test]
  fn last_policy_only_sees_final_detection() {
    let folded = [true, false]
      .into_iter()
      .fold(false, |found, matched| ExitPolicy::Last.fold(found, matched));
    assert!(!folded);

    let folded = [false, true]
      .into_iter()
      .fold(false, |found, matched| ExitPolicy::Last.fold(found, matched));
    assert!(folded);
  }
}
