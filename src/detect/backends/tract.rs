#![cfg(feature = "backend-tract")]

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use image::DynamicImage;
use tract_onnx::prelude::*;

use crate::detect::backend::PersonDetector;
use crate::detect::result::DetectionResult;
use crate::validate::decode_image;

/// Index of the "person" class score row in YOLOv8 output (after the 4 box rows).
const PERSON_SCORE_ROW: usize = 4;

/// Tract-based person detector for YOLOv8-style ONNX models.
///
/// The model is loaded once from a local file. Output is expected as
/// `[1, 4 + classes, anchors]`; only the person class is considered.
pub struct TractPersonDetector {
    model: SimplePlan<TypedFact, Box<dyn TypedOp>>,
    input_size: u32,
    confidence_threshold: f32,
    iou_threshold: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct PersonBox {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    score: f32,
}

impl TractPersonDetector {
    /// Load an ONNX model from disk and prepare it for inference.
    pub fn new<P: AsRef<Path>>(
        model_path: P,
        input_size: u32,
        confidence_threshold: f32,
        iou_threshold: f32,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();
        if !model_path.is_file() {
            return Err(anyhow!(
                "model weights not found at {}",
                model_path.display()
            ));
        }
        let side = input_size as usize;
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .with_context(|| format!("failed to load ONNX model from {}", model_path.display()))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, 3, side, side)),
            )
            .context("failed to set input fact")?
            .into_optimized()
            .context("failed to optimize ONNX model")?
            .into_runnable()
            .context("failed to build runnable ONNX model")?;

        Ok(Self {
            model,
            input_size,
            confidence_threshold,
            iou_threshold,
        })
    }

    fn build_input(&self, image: &DynamicImage) -> Tensor {
        let side = self.input_size;
        let rgb = image
            .resize_exact(side, side, image::imageops::FilterType::Triangle)
            .to_rgb8();
        let side = side as usize;
        let input = tract_ndarray::Array4::from_shape_fn(
            (1, 3, side, side),
            |(_, channel, y, x)| rgb.get_pixel(x as u32, y as u32)[channel] as f32 / 255.0,
        );
        input.into_tensor()
    }

    fn person_boxes(&self, outputs: TVec<TValue>) -> Result<Vec<PersonBox>> {
        let output = outputs
            .first()
            .ok_or_else(|| anyhow!("model produced no outputs"))?;
        let view = output
            .to_array_view::<f32>()
            .context("model output tensor was not f32")?;
        let shape = view.shape().to_vec();
        if shape.len() != 3 || shape[1] <= PERSON_SCORE_ROW {
            return Err(anyhow!("unexpected model output shape {:?}", shape));
        }

        let mut boxes = Vec::new();
        for i in 0..shape[2] {
            let score = view[[0, PERSON_SCORE_ROW, i]];
            if !score.is_finite() || score < self.confidence_threshold {
                continue;
            }
            let cx = view[[0, 0, i]];
            let cy = view[[0, 1, i]];
            let w = view[[0, 2, i]];
            let h = view[[0, 3, i]];
            boxes.push(PersonBox {
                x1: cx - w / 2.0,
                y1: cy - h / 2.0,
                x2: cx + w / 2.0,
                y2: cy + h / 2.0,
                score,
            });
        }
        Ok(non_max_suppression(boxes, self.iou_threshold))
    }

    fn infer(&mut self, image_path: &Path) -> Result<DetectionResult> {
        let image = decode_image(image_path)
            .with_context(|| format!("failed to decode {}", image_path.display()))?;
        let input = self.build_input(&image);
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .context("ONNX inference failed")?;
        let boxes = self.person_boxes(outputs)?;
        let max_person_conf = boxes.iter().map(|b| b.score).fold(0.0_f32, f32::max);
        Ok(DetectionResult {
            person_count: boxes.len() as u32,
            max_person_conf,
            detection_error: String::new(),
        })
    }
}

impl PersonDetector for TractPersonDetector {
    fn name(&self) -> &'static str {
        "tract"
    }

    fn detect(&mut self, image_path: &Path) -> DetectionResult {
        match self.infer(image_path) {
            Ok(result) => result,
            Err(err) => {
                log::debug!("detection failed for {}: {:#}", image_path.display(), err);
                DetectionResult::failed(format!("{:#}", err))
            }
        }
    }
}

fn iou(a: &PersonBox, b: &PersonBox) -> f32 {
    let ix = (a.x2.min(b.x2) - a.x1.max(b.x1)).max(0.0);
    let iy = (a.y2.min(b.y2) - a.y1.max(b.y1)).max(0.0);
    let intersection = ix * iy;
    let area_a = (a.x2 - a.x1) * (a.y2 - a.y1);
    let area_b = (b.x2 - b.x1) * (b.y2 - b.y1);
    let union = area_a + area_b - intersection;
    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}

/// Greedy NMS: keep the best-scoring box, drop overlaps above `iou_threshold`.
fn non_max_suppression(mut boxes: Vec<PersonBox>, iou_threshold: f32) -> Vec<PersonBox> {
    boxes.sort_by(|a, b| b.score.total_cmp(&a.score));
    let mut keep: Vec<PersonBox> = Vec::new();
    for candidate in boxes {
        if keep.iter().all(|kept| iou(kept, &candidate) < iou_threshold) {
            keep.push(candidate);
        }
    }
    keep
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bx(x1: f32, y1: f32, x2: f32, y2: f32, score: f32) -> PersonBox {
        PersonBox {
            x1,
            y1,
            x2,
            y2,
            score,
        }
    }

    #[test]
    fn nms_drops_overlapping_lower_scores() {
        let boxes = vec![
            bx(0.0, 0.0, 10.0, 10.0, 0.6),
            bx(1.0, 1.0, 10.0, 10.0, 0.9),
            bx(50.0, 50.0, 60.0, 60.0, 0.4),
        ];
        let kept = non_max_suppression(boxes, 0.7);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].score, 0.9);
        assert_eq!(kept[1].score, 0.4);
    }

    #[test]
    fn disjoint_boxes_have_zero_iou() {
        let a = bx(0.0, 0.0, 1.0, 1.0, 0.5);
        let b = bx(2.0, 2.0, 3.0, 3.0, 0.5);
        assert_eq!(iou(&a, &b), 0.0);
    }

    #[test]
    fn missing_weights_fail_construction() {
        let err = TractPersonDetector::new("/nonexistent/yolov8n.onnx", 640, 0.25, 0.7)
            .err()
            .expect("construction fails");
        assert!(err.to_string().contains("model weights not found"));
    }
}
