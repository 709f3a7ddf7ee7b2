// 该文件是 Shanan （山南西风） 项目的一部分。
// src/args.rs - 项目参数配置
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

use std::path::PathBuf;

use clap::Parser;

use crate::{preprocess::ColorOrder, task::ExitPolicy};

pub const DEFAULT_GRAPH: &str = "../../caffe/SSD_MobileNet/graph";
pub const DEFAULT_LABELS: &str = "../../caffe/SSD_MobileNet/labels.txt";
pub const DEFAULT_CAPTURES_DIR: &str = "/var/tmp/captures";
pub const DEFAULT_LATEST_PATH: &str = "/var/tmp/detection.jpg";

/// Shanan 哨兵：在神经网络加速器上对单张图像做行人检测
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 神经网络图（已编译模型）文件路径
  #[arg(short = 'g', long, default_value = DEFAULT_GRAPH, value_name = "FILE")]
  pub graph: PathBuf,

  /// V4L2 视频设备编号，例如 0 对应 /dev/video0（仅记录，不参与检测）
  #[arg(short = 'v', long, default_value_t = 0, value_name = "INDEX")]
  pub video: u32,

  /// 标签文件路径，每行一个类别名，首行 `classes` 会被跳过
  #[arg(short = 'l', long, default_value = DEFAULT_LABELS, value_name = "FILE")]
  pub labels: PathBuf,

  /// 各通道均值
  #[arg(
    short = 'M',
    long,
    num_args = 3,
    allow_negative_numbers = true,
    default_values_t = [127.5f32, 127.5, 127.5],
    value_name = "MEAN"
  )]
  pub mean: Vec<f32>,

  /// 缩放系数
  #[arg(short = 'S', long, default_value_t = 0.00789, value_name = "FACTOR")]
  pub scale: f32,

  /// 网络输入尺寸（宽 高），例如 -D 224 224
  #[arg(short = 'D', long, num_args = 2, default_values_t = [300u32, 300], value_name = "DIM")]
  pub dim: Vec<u32>,

  /// 网络期望的颜色通道顺序
  #[arg(short = 'c', long = "colormode", value_enum, default_value_t = ColorOrder::Bgr)]
  pub color_mode: ColorOrder,

  /// 待处理图像，相对路径基于当前工作目录解析
  #[arg(short = 'i', long, value_name = "FILE")]
  pub image: Option<PathBuf>,

  /// 检测置信度阈值（百分比）
  #[arg(
    short = 't',
    long,
    default_value_t = 60,
    value_parser = clap::value_parser!(u8).range(0..=100),
    value_name = "PERCENT"
  )]
  pub threshold: u8,

  /// 快照目录，标注后的图像以输入文件名保存于此
  #[arg(long, default_value = DEFAULT_CAPTURES_DIR, value_name = "DIR")]
  pub captures_dir: PathBuf,

  /// 最近一次检测结果的固定保存路径
  #[arg(long, default_value = DEFAULT_LATEST_PATH, value_name = "FILE")]
  pub latest: PathBuf,

  /// 标签文字所用字体（TTF/OTF），未指定时使用系统字体
  #[arg(long, value_name = "FILE")]
  pub font: Option<PathBuf>,

  /// 退出码判定方式：any 为任一检测命中，last 为仅看最后一个达到阈值的检测
  #[arg(long, value_enum, default_value_t = ExitPolicy::Any)]
  pub exit_policy: ExitPolicy,
}
