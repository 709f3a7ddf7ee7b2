//! 流程测试使用的脚本化加速器

#![allow(dead_code)]

use std::{cell::RefCell, io, time::Duration};

use half::f16;
use shanan_sentry::{
  device::{Accelerator, DeviceHandle, OutputTensor},
  frame::F16NhwcTensor,
};

/// 回放固定的输出张量，并记录每一次驱动调用
pub struct ScriptedAccelerator {
  devices: usize,
  output: OutputTensor,
  calls: RefCell<Vec<String>>,
}

impl ScriptedAccelerator {
  pub fn new(devices: usize, output: OutputTensor) -> Self {
    Self {
      devices,
      output,
      calls: RefCell::new(Vec::new()),
    }
  }

  pub fn with_detections(detections: &[(f32, f32)]) -> Self {
    Self::new(1, ssd_output(detections))
  }

  pub fn calls(&self) -> Vec<String> {
    self.calls.borrow().clone()
  }

  fn record(&self, call: impl Into<String>) {
    self.calls.borrow_mut().push(call.into());
  }
}

impl Accelerator for ScriptedAccelerator {
  type Device = ();
  type Graph = usize;
  type Error = io::Error;

  fn enumerate(&self) -> Result<Vec<DeviceHandle>, io::Error> {
    self.record("enumerate");
    Ok(
      (0..self.devices)
        .map(|i| DeviceHandle::new(format!("scripted{i}")))
        .collect(),
    )
  }

  fn open(&self, handle: &DeviceHandle) -> Result<(), io::Error> {
    self.record(format!("open {}", handle.name));
    Ok(())
  }

  fn load_graph(&self, _device: &mut (), blob: &[u8]) -> Result<usize, io::Error> {
    self.record("load_graph");
    Ok(blob.len())
  }

  fn infer(
    &self,
    _graph: &usize,
    tensor: &F16NhwcTensor,
  ) -> Result<(OutputTensor, Duration), io::Error> {
    self.record(format!("infer {}x{}", tensor.width(), tensor.height()));
    Ok((self.output.clone(), Duration::from_millis(80)))
  }

  fn deallocate(&self, _graph: usize) -> Result<(), io::Error> {
    self.record("deallocate");
    Ok(())
  }

  fn close(&self, _device: ()) -> Result<(), io::Error> {
    self.record("close");
    Ok(())
  }
}

/// 每个 `(class_id, score)` 生成一条 SSD 记录，边框统一为
/// `[y1, x1, y2, x2] = [0.25, 0.25, 0.75, 0.75]`
pub fn ssd_output(detections: &[(f32, f32)]) -> OutputTensor {
  let mut values = vec![0.0f32; 7];
  values[0] = detections.len() as f32;
  for &(class_id, score) in detections {
    values.extend_from_slice(&[0.0, class_id, score, 0.25, 0.25, 0.75, 0.75]);
  }
  let halves = values.into_iter().map(f16::from_f32).collect::<Vec<_>>();
  OutputTensor::from_f16(&halves)
}
