//! Object detection over a decoded image.
//!
//! The pipeline only sees the [`ObjectDetector`] trait. [`YoloDetector`] is the
//! production implementation: a YOLOv8 ONNX export loaded once at startup.

use anyhow::{anyhow, Result};
use image::{DynamicImage, GenericImageView};
use ort::{session::Session, value::Value};
use serde::Serialize;
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use crate::color_utils::symbols;
use crate::detection_obj::DetectedObject;
use crate::domain::PlasticAnalysis;
use crate::onnx_session::{create_onnx_session, ModelInfo, SessionConfig};
use crate::yolo_postprocessing::postprocess_output;
use crate::yolo_preprocessing::preprocess_image;

/// Used when the model declares a dynamic input size.
pub const DEFAULT_MODEL_SIZE: u32 = 640;

pub trait ObjectDetector {
    /// Run the model and return boxes in original-image coordinates.
    fn detect(&self, image: &DynamicImage) -> Result<Vec<DetectedObject>>;
}

/// Run `detector` over `image` and score the result.
pub fn analyze_image<D: ObjectDetector + ?Sized>(
    detector: &D,
    image: &DynamicImage,
) -> Result<PlasticAnalysis> {
    let (width, height) = image.dimensions();
    let detections = detector.detect(image)?;
    let analysis = PlasticAnalysis::from_detections(detections, width, height);

    log::info!(
        "Detected {} object(s) in {}x{} image, density score {:.2}",
        analysis.object_count,
        width,
        height,
        analysis.density_score
    );

    Ok(analysis)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectorParams {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            iou_threshold: 0.45,
        }
    }
}

pub struct YoloDetector {
    // `Session::run` needs `&mut`, the detector is shared by reference
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    model_size: u32,
    params: DetectorParams,
    model_info: ModelInfo,
}

impl YoloDetector {
    pub fn load(model_path: &Path, device: &str, params: DetectorParams) -> Result<Self> {
        let load_start = Instant::now();
        let (session, model_info) = create_onnx_session(model_path, &SessionConfig { device })?;

        let input_md = session
            .inputs
            .first()
            .ok_or_else(|| anyhow!("Model has no inputs"))?;
        let input_name = input_md.name.clone();

        let model_size = match &input_md.input_type {
            ort::value::ValueType::Tensor { shape, .. } => {
                let dims = shape.to_vec();
                match dims.get(3) {
                    Some(&size) if size > 0 => size as u32,
                    _ => {
                        log::debug!(
                            "Dynamic input shape {dims:?}, using {DEFAULT_MODEL_SIZE}x{DEFAULT_MODEL_SIZE}"
                        );
                        DEFAULT_MODEL_SIZE
                    }
                }
            }
            other => {
                log::debug!("Unexpected input type: {other:?}. Defaulting to {DEFAULT_MODEL_SIZE}");
                DEFAULT_MODEL_SIZE
            }
        };

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| anyhow!("Model has no outputs"))?;

        log::info!(
            "{}Loaded detector {} ({:.1} MB, input {model_size}px) in {:.1}ms",
            symbols::model_loaded(),
            model_info.model_path,
            model_info.model_size_bytes as f64 / (1024.0 * 1024.0),
            load_start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            model_size,
            params,
            model_info,
        })
    }

    pub fn model_info(&self) -> &ModelInfo {
        &self.model_info
    }
}

impl ObjectDetector for YoloDetector {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<DetectedObject>> {
        let (input_tensor, letterbox) = preprocess_image(image, self.model_size)?;

        let inference_start = Instant::now();
        let input_value = Value::from_array(input_tensor)
            .map_err(|e| anyhow!("Failed to create input value: {}", e))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("Detector session lock poisoned"))?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_value])
            .map_err(|e| anyhow!("Failed to run inference: {}", e))?;

        let output_array = outputs[self.output_name.as_str()]
            .try_extract_array::<f32>()
            .map_err(|e| anyhow!("Failed to extract output array: {}", e))?
            .to_owned();

        log::debug!(
            "Inference completed in {:.1} ms",
            inference_start.elapsed().as_secs_f64() * 1000.0
        );

        postprocess_output(
            &output_array,
            self.params.confidence_threshold,
            self.params.iou_threshold,
            &letterbox,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    struct FixedDetector(Vec<DetectedObject>);

    impl ObjectDetector for FixedDetector {
        fn detect(&self, _image: &DynamicImage) -> Result<Vec<DetectedObject>> {
            Ok(self.0.clone())
        }
    }

    struct FailingDetector;

    impl ObjectDetector for FailingDetector {
        fn detect(&self, _image: &DynamicImage) -> Result<Vec<DetectedObject>> {
            Err(anyhow!("model exploded"))
        }
    }

    #[test]
    fn test_analyze_image_scores_density() {
        let detector = FixedDetector(vec![
            DetectedObject::new("bottle", 0.9, [0.0, 0.0, 5.0, 5.0]),
            DetectedObject::new("cup", 0.7, [10.0, 10.0, 20.0, 20.0]),
        ]);
        let img = DynamicImage::ImageRgb8(RgbImage::new(100, 100));
        let analysis = analyze_image(&detector, &img).unwrap();
        assert_eq!(analysis.object_count, 2);
        assert_eq!(analysis.density_score, 2.0);
        assert_eq!(analysis.detections.len(), 2);
    }

    #[test]
    fn test_analyze_image_propagates_model_failure() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(10, 10));
        let err = analyze_image(&FailingDetector, &img).unwrap_err();
        assert!(err.to_string().contains("model exploded"));
    }

    #[test]
    fn test_default_params() {
        let params = DetectorParams::default();
        assert_eq!(params.confidence_threshold, 0.25);
        assert_eq!(params.iou_threshold, 0.45);
    }
}
