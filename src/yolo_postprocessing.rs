use std::collections::HashMap;

use anyhow::Result;
use ndarray::Array;

use crate::detection_obj::DetectedObject;
use crate::yolo_preprocessing::Letterbox;

/// Class names of the 80-class COCO set used by stock YOLOv8 exports.
pub const COCO_CLASSES: [&str; 80] = [
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket", "bottle",
    "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich", "orange",
    "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch", "potted plant",
    "bed", "dining table", "toilet", "tv", "laptop", "mouse", "remote", "keyboard", "cell phone",
    "microwave", "oven", "toaster", "sink", "refrigerator", "book", "clock", "vase", "scissors",
    "teddy bear", "hair drier", "toothbrush",
];

pub fn class_name(class_id: u32) -> String {
    COCO_CLASSES
        .get(class_id as usize)
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("class_{class_id}"))
}

fn by_confidence_desc(a: &DetectedObject, b: &DetectedObject) -> std::cmp::Ordering {
    b.confidence.total_cmp(&a.confidence)
}

/// Per-class non-maximum suppression.
pub fn nms(detections: Vec<DetectedObject>, iou_threshold: f32) -> Vec<DetectedObject> {
    if detections.is_empty() {
        return detections;
    }

    let mut class_groups: HashMap<Option<u32>, Vec<DetectedObject>> = HashMap::new();
    for detection in detections {
        class_groups
            .entry(detection.class_id)
            .or_default()
            .push(detection);
    }

    let mut all_results = Vec::new();

    for (_, mut class_detections) in class_groups {
        class_detections.sort_by(by_confidence_desc);

        let mut suppressed = vec![false; class_detections.len()];
        for i in 0..class_detections.len() {
            if suppressed[i] {
                continue;
            }
            for j in (i + 1)..class_detections.len() {
                if !suppressed[j] && class_detections[i].iou(&class_detections[j]) > iou_threshold {
                    suppressed[j] = true;
                }
            }
        }

        all_results.extend(
            class_detections
                .into_iter()
                .zip(suppressed)
                .filter(|(_, s)| !s)
                .map(|(d, _)| d),
        );
    }

    all_results
}

/// Decode a YOLOv8 output tensor of shape `[1, 4 + num_classes, num_boxes]`.
///
/// Returned boxes are in original-image coordinates, sorted by descending
/// confidence.
pub fn postprocess_output(
    output: &Array<f32, ndarray::IxDyn>,
    confidence_threshold: f32,
    iou_threshold: f32,
    letterbox: &Letterbox,
) -> Result<Vec<DetectedObject>> {
    let shape = output.shape();
    if shape.len() != 3 {
        return Err(anyhow::anyhow!("Expected 3D output, got {}D", shape.len()));
    }
    if shape[1] <= 4 {
        return Err(anyhow::anyhow!(
            "Expected at least one class channel, got shape {shape:?}"
        ));
    }
    let num_classes = shape[1] - 4;
    let num_boxes = shape[2];

    let mut detections = Vec::new();
    for i in 0..num_boxes {
        let mut max_confidence = 0.0;
        let mut best_class_id = 0;
        for class_idx in 0..num_classes {
            let class_confidence = output[[0, 4 + class_idx, i]];
            if class_confidence > max_confidence {
                max_confidence = class_confidence;
                best_class_id = class_idx as u32;
            }
        }

        if max_confidence <= confidence_threshold {
            continue;
        }

        let x_center = output[[0, 0, i]];
        let y_center = output[[0, 1, i]];
        let width = output[[0, 2, i]];
        let height = output[[0, 3, i]];

        let (x1, y1) = letterbox.to_original(x_center - width / 2.0, y_center - height / 2.0);
        let (x2, y2) = letterbox.to_original(x_center + width / 2.0, y_center + height / 2.0);

        detections.push(DetectedObject {
            label: class_name(best_class_id),
            confidence: max_confidence,
            bbox: [x1, y1, x2, y2],
            class_id: Some(best_class_id),
        });
    }

    let mut kept = nms(detections, iou_threshold);
    kept.sort_by(by_confidence_desc);
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_letterbox() -> Letterbox {
        Letterbox {
            scale: 1.0,
            pad_x: 0.0,
            pad_y: 0.0,
            orig_width: 640,
            orig_height: 640,
        }
    }

    fn boxed(class_id: u32, confidence: f32, bbox: [f32; 4]) -> DetectedObject {
        DetectedObject {
            label: class_name(class_id),
            confidence,
            bbox,
            class_id: Some(class_id),
        }
    }

    /// Build a `[1, 4 + classes, boxes]` tensor from (cx, cy, w, h, class, score) rows.
    fn output_tensor(classes: usize, rows: &[(f32, f32, f32, f32, usize, f32)]) -> Array<f32, ndarray::IxDyn> {
        let mut out = Array::zeros(ndarray::IxDyn(&[1, 4 + classes, rows.len()]));
        for (i, &(cx, cy, w, h, class, score)) in rows.iter().enumerate() {
            out[[0, 0, i]] = cx;
            out[[0, 1, i]] = cy;
            out[[0, 2, i]] = w;
            out[[0, 3, i]] = h;
            out[[0, 4 + class, i]] = score;
        }
        out
    }

    #[test]
    fn test_class_names() {
        assert_eq!(class_name(0), "person");
        assert_eq!(class_name(39), "bottle");
        assert_eq!(class_name(200), "class_200");
    }

    #[test]
    fn test_nms_suppresses_overlapping_same_class() {
        let detections = vec![
            boxed(39, 0.9, [0.0, 0.0, 10.0, 10.0]),
            boxed(39, 0.8, [1.0, 1.0, 11.0, 11.0]),
            boxed(41, 0.7, [1.0, 1.0, 11.0, 11.0]),
        ];
        let mut kept = nms(detections, 0.45);
        kept.sort_by(by_confidence_desc);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].confidence, 0.9);
        assert_eq!(kept[1].label, "cup");
    }

    #[test]
    fn test_postprocess_filters_and_sorts() {
        let output = output_tensor(
            80,
            &[
                (100.0, 100.0, 20.0, 20.0, 39, 0.6),
                (300.0, 300.0, 40.0, 40.0, 41, 0.9),
                (500.0, 500.0, 10.0, 10.0, 39, 0.1),
            ],
        );
        let detections = postprocess_output(&output, 0.25, 0.45, &identity_letterbox()).unwrap();
        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].label, "cup");
        assert_eq!(detections[0].bbox, [280.0, 280.0, 320.0, 320.0]);
        assert_eq!(detections[1].label, "bottle");
        assert_eq!(detections[1].class_id, Some(39));
    }

    #[test]
    fn test_postprocess_rejects_wrong_rank() {
        let output = Array::zeros(ndarray::IxDyn(&[84, 10]));
        assert!(postprocess_output(&output, 0.25, 0.45, &identity_letterbox()).is_err());
    }
}
