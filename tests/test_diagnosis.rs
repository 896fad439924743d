extern crate cropix_detect;

use std::sync::Arc;
use image::ImageFormat;
use rand::Rng;
use cropix_detect::common::{generic_description, KnowledgeBase, HealthStatus, LabelSet, DISEASE_RECOMMENDATIONS,
                            HEALTHY_DESCRIPTION};
use cropix_detect::{DiagnosisError, DiagnosisRequest, DiagnosisService, StartupError};

mod fixtures;
use fixtures::*;

fn tomato_service(output: &[f32]) -> (DiagnosisService, Arc<FixedScorer>) {
    let scorer = Arc::new(FixedScorer::new(output));
    let service = DiagnosisService::builder()
        .labels(tomato_labels())
        .scorer(Arc::clone(&scorer))
        .build()
        .unwrap();
    (service, scorer)
}

#[test]
fn healthy_leaf_end_to_end() {
    let (service, scorer) = tomato_service(&[0.9, 0.05, 0.05]);
    let bytes = leaf_image_bytes(512, 512, ImageFormat::Jpeg);

    let diagnosis = service.diagnose(&bytes).unwrap();

    assert_eq!(diagnosis.label, "Tomato_Healthy");
    assert_eq!(diagnosis.class_index, 0);
    assert_eq!(diagnosis.confidence, 0.9);
    assert_eq!(diagnosis.confidence_percentage, 90.0);
    assert!(diagnosis.is_healthy);
    assert_eq!(diagnosis.description, HEALTHY_DESCRIPTION);
    assert_eq!(diagnosis.recommendations.len(), 5);
    assert_eq!(diagnosis.crop_type, "Unknown");
    assert_eq!(diagnosis.top_predictions.len(), 3);
    assert_eq!(diagnosis.top_predictions[0].label, "Tomato_Healthy");

    assert_eq!(scorer.calls(), 1);
    assert_eq!(scorer.shapes.lock().as_slice(), &[vec![1, 224, 224, 3]]);
    assert_eq!(service.stats().runs(), 1);
}

#[test]
fn unavailable_scorer_skips_decode() {
    let service = DiagnosisService::builder()
        .labels(tomato_labels())
        .unavailable("model.onnx missing")
        .build()
        .unwrap();

    let bytes = leaf_image_bytes(512, 512, ImageFormat::Jpeg);
    let err = service.diagnose(&bytes).unwrap_err();
    assert!(matches!(err, DiagnosisError::ServiceUnavailable(_)));
    assert_eq!(err.status_code(), 503);

    // garbage would be a decode error if it were decoded at all
    let err = service.diagnose(b"definitely not an image").unwrap_err();
    assert!(matches!(err, DiagnosisError::ServiceUnavailable(_)));
}

#[test]
fn random_bytes_are_a_decode_error() {
    let (service, scorer) = tomato_service(&[0.9, 0.05, 0.05]);

    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..4096).map(|_| rng.gen()).collect();

    let err = service.diagnose(&bytes).unwrap_err();
    assert!(matches!(err, DiagnosisError::Decode(_)));
    assert!(err.is_client_error());
    assert_eq!(err.status_code(), 400);
    assert_eq!(scorer.calls(), 0);

    assert!(matches!(service.diagnose(&[]).unwrap_err(), DiagnosisError::Decode(_)));
}

#[test]
fn unknown_disease_gets_generic_guidance() {
    let labels = LabelSet::new(vec!["Potato_Healthy".to_string(), "Potato_Blight".to_string()]).unwrap();
    let knowledge = KnowledgeBase::from_json_str(
        r#"{"Potato_Healthy": {"description": "Fine.", "remedies": ["Keep watering"]}}"#,
    ).unwrap();
    let service = DiagnosisService::builder()
        .labels(labels)
        .knowledge(knowledge)
        .scorer(FixedScorer::new(&[0.2, 0.8]))
        .build()
        .unwrap();

    let diagnosis = service.diagnose(&leaf_image_bytes(300, 200, ImageFormat::Png)).unwrap();

    assert_eq!(diagnosis.label, "Potato_Blight");
    assert!(!diagnosis.is_healthy);
    assert_eq!(diagnosis.description, generic_description("Potato_Blight"));
    assert!(diagnosis.description.contains("Potato_Blight"));

    let mut expected = vec!["Disease detected: Potato_Blight".to_string()];
    expected.extend(DISEASE_RECOMMENDATIONS.iter().map(|s| s.to_string()));
    assert_eq!(diagnosis.recommendations, expected);
}

#[test]
fn crop_type_and_declared_format_pass_through() {
    let (service, _) = tomato_service(&[0.1, 0.7, 0.2]);
    let bytes = leaf_image_bytes(64, 64, ImageFormat::Png);

    let request = DiagnosisRequest::new(&bytes)
        .with_crop_type("tomato")
        .with_declared_format(ImageFormat::Png);
    let diagnosis = service.diagnose_with(&request).unwrap();
    assert_eq!(diagnosis.crop_type, "tomato");
    assert_eq!(diagnosis.label, "Tomato_Blight");

    let lying = DiagnosisRequest::new(&bytes).with_declared_format(ImageFormat::Jpeg);
    assert!(matches!(service.diagnose_with(&lying).unwrap_err(), DiagnosisError::Decode(_)));

    let via_entry_point = cropix_detect::run_diagnosis(&service, &bytes, Some("roma")).unwrap();
    assert_eq!(via_entry_point.crop_type, "roma");
}

#[test]
fn scorer_failures_are_inference_errors() {
    let bytes = leaf_image_bytes(128, 128, ImageFormat::Jpeg);

    let service = DiagnosisService::builder()
        .labels(tomato_labels())
        .scorer(FailingScorer)
        .build()
        .unwrap();
    match service.diagnose(&bytes).unwrap_err() {
        DiagnosisError::Inference(msg) => assert!(msg.contains("device lost")),
        other => panic!("unexpected {other:?}"),
    }

    let service = DiagnosisService::builder()
        .labels(tomato_labels())
        .scorer(PanickingScorer)
        .build()
        .unwrap();
    match service.diagnose(&bytes).unwrap_err() {
        DiagnosisError::Inference(msg) => assert!(msg.contains("kernel exploded")),
        other => panic!("unexpected {other:?}"),
    }
    // still serving after the panic
    assert!(service.health().model_loaded);
}

#[test]
fn output_length_mismatch_is_configuration_error() {
    let (service, _) = tomato_service(&[0.5, 0.5]);
    let err = service.diagnose(&leaf_image_bytes(64, 64, ImageFormat::Png)).unwrap_err();
    assert!(matches!(err, DiagnosisError::Configuration(_)));
    assert_eq!(err.status_code(), 500);
}

#[test]
fn all_nan_output_is_inference_error() {
    let (service, _) = tomato_service(&[f32::NAN, f32::NAN, f32::NAN]);
    let err = service.diagnose(&leaf_image_bytes(64, 64, ImageFormat::Png)).unwrap_err();
    assert!(matches!(err, DiagnosisError::Inference(_)));
}

#[test]
fn fixed_output_length_is_checked_at_startup() {
    let err = DiagnosisService::builder()
        .labels(tomato_labels())
        .scorer(FixedScorer::new(&[0.5, 0.5]).with_fixed_len())
        .build()
        .unwrap_err();
    assert!(matches!(err, StartupError::LabelCountMismatch { scorer: 2, labels: 3 }));

    let err = DiagnosisService::builder().scorer(FixedScorer::new(&[1.0])).build().unwrap_err();
    assert!(matches!(err, StartupError::LabelsNotSet));
}

#[test]
fn health_and_classes() {
    let (service, scorer) = tomato_service(&[0.9, 0.05, 0.05]);
    let health = service.health();
    assert_eq!(health.status, HealthStatus::Healthy);
    assert!(health.model_loaded);
    assert_eq!(health.total_classes, 3);
    assert_eq!(service.classes().unwrap(), &TOMATO_LABELS.map(String::from));
    assert_eq!(scorer.calls(), 0);

    let degraded = DiagnosisService::builder()
        .labels(tomato_labels())
        .unavailable("no weights")
        .build()
        .unwrap();
    let health = degraded.health();
    assert_eq!(health.status, HealthStatus::Degraded);
    assert!(!health.model_loaded);
    assert_eq!(health.total_classes, 3);
    assert!(matches!(degraded.classes().unwrap_err(), DiagnosisError::ServiceUnavailable(_)));
}

#[test]
fn diagnosis_serializes_for_transport() {
    let (service, _) = tomato_service(&[0.05, 0.05, 0.9]);
    let diagnosis = service.diagnose(&leaf_image_bytes(100, 100, ImageFormat::Gif)).unwrap();
    let json = serde_json::to_value(&diagnosis).unwrap();
    assert_eq!(json["label"], "Tomato_Rust");
    assert_eq!(json["is_healthy"], false);
    assert_eq!(json["confidence_percentage"], 90.0);
    assert!(json["timestamp"].is_string());

    let diagnosis = service.diagnose(&leaf_image_bytes(100, 100, ImageFormat::WebP)).unwrap();
    assert_eq!(diagnosis.label, "Tomato_Rust");
}
