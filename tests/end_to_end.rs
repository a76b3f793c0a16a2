//! End-to-end runs: exchange document on disk -> measurement -> verification.

use std::path::Path;

use animal_eye_distance::verify::{read_ground_truth, MissingReason, Outcome};
use animal_eye_distance::{
    load_scenes, measure_scenes, Document, MeasurementKind, Participants, Report, VerifyOptions,
};
use approx::assert_relative_eq;

/// A 6x6 square contour centred on (x, y), encoded the way the eye
/// segmentation stage writes it.
fn eye(x: i32, y: i32) -> String {
    format!(
        "\"[[{},{}],[{},{}],[{},{}],[{},{}]]\"",
        x - 3,
        y - 3,
        x + 3,
        y - 3,
        x + 3,
        y + 3,
        x - 3,
        y + 3
    )
}

fn masks_json() -> String {
    format!(
        r#"{{
            "000000018155.jpg": {{
                "width": 640, "height": 480, "animals_found": 2,
                "objects": [
                    {{"object_id": 0, "class": "dog", "confidence": 0.94,
                      "bbox": [60, 150, 150, 200],
                      "eyes": [{}, {}]}},
                    {{"object_id": 1, "class": "dog", "confidence": 0.88,
                      "bbox": [380, 150, 120, 200],
                      "eyes": [{}, {}]}}
                ]
            }},
            "000000114269.jpg": {{
                "width": 640, "height": 427, "animals_found": 1,
                "objects": [
                    {{"object_id": 0, "class": "cat",
                      "bbox": [20, 20, 120, 120],
                      "eyes": [{}, {}]}}
                ]
            }},
            "000000000001.jpg": {{
                "width": 640, "height": 480, "animals_found": 1,
                "objects": [
                    {{"object_id": 0, "class": "bird", "bbox": [0, 0, 10, 10], "eyes": []}}
                ]
            }}
        }}"#,
        // PD 60
        eye(100, 200),
        eye(160, 200),
        // Right eye 280 px right of the first dog's; PD 19. Listed right first.
        eye(440, 200),
        eye(421, 200),
        // PD 33
        eye(50, 60),
        eye(83, 60),
    )
}

const GROUND_TRUTH: &str = "Image_Name,Type,Obj_ID_1,Obj_ID_2,Expected_Dist
000000018155.jpg,Individual,0,,60
000000018155.jpg,Individual,1,,19
000000018155.jpg,Pair,1,0,280
000000114269.jpg,Individual,0,,33
000000114269.jpg,Pair,0,1,150
";

fn write_masks(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("animal_masks.json");
    std::fs::write(&path, masks_json()).unwrap();
    path
}

#[test]
fn two_dogs_pd_and_rr_pass() {
    let dir = tempfile::tempdir().unwrap();
    let scenes = load_scenes(write_masks(dir.path())).unwrap();
    let measured = measure_scenes(&scenes);

    let dogs = measured
        .iter()
        .find(|m| m.image == "000000018155.jpg")
        .unwrap();
    let distances: Vec<(Participants, f64)> = dogs
        .records
        .iter()
        .map(|r| (r.participants, r.distance))
        .collect();
    assert_eq!(distances.len(), 3);
    assert_eq!(distances[0].0, Participants::Individual { id: 0 });
    assert_relative_eq!(distances[0].1, 60.0, epsilon = 1e-9);
    assert_eq!(distances[1].0, Participants::Individual { id: 1 });
    assert_relative_eq!(distances[1].1, 19.0, epsilon = 1e-9);
    assert_eq!(distances[2].0, Participants::Pair { id1: 0, id2: 1 });
    assert_relative_eq!(distances[2].1, 280.0, epsilon = 1e-9);

    let truth = read_ground_truth(GROUND_TRUTH.as_bytes()).unwrap();
    let report = Report::measure(&scenes).verified(&truth, &VerifyOptions::default());
    let verification = report.verification.unwrap();
    let dog_verdicts: Vec<_> = verification
        .verdicts
        .iter()
        .filter(|v| v.image == "000000018155.jpg")
        .collect();
    assert_eq!(dog_verdicts.len(), 3);
    for v in dog_verdicts {
        match v.outcome {
            Outcome::Pass { error, .. } => assert_relative_eq!(error, 0.0, epsilon = 1e-9),
            other => panic!("{} {}: {:?}", v.image, v.participants, other),
        }
    }
}

#[test]
fn single_cat_pd_passes_and_pair_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let scenes = load_scenes(write_masks(dir.path())).unwrap();
    let truth = read_ground_truth(GROUND_TRUTH.as_bytes()).unwrap();
    let report = Report::measure(&scenes).verified(&truth, &VerifyOptions::default());

    let cat = report
        .images
        .iter()
        .find(|m| m.image == "000000114269.jpg")
        .unwrap();
    assert_eq!(cat.pupillary().count(), 1);
    assert_relative_eq!(cat.records[0].distance, 33.0, epsilon = 1e-9);
    assert_eq!(cat.pairs().count(), 0);

    let verification = report.verification.unwrap();
    let cat_verdicts: Vec<_> = verification
        .verdicts
        .iter()
        .filter(|v| v.image == "000000114269.jpg")
        .collect();
    assert!(matches!(cat_verdicts[0].outcome, Outcome::Pass { .. }));
    assert_eq!(cat_verdicts[1].participants.kind(), MeasurementKind::Pair);
    assert_eq!(
        cat_verdicts[1].outcome,
        Outcome::Missing {
            expected: 150.0,
            reason: MissingReason::NoRecord
        }
    );

    let summary = verification.summary;
    assert_eq!(summary.passed, 4);
    assert_eq!(summary.missing, 1);
    assert_eq!(summary.mismatched, 0);
    assert_eq!(summary.unverified, 0);
    assert!(!summary.all_passed());
}

#[test]
fn empty_eye_masks_contribute_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let scenes = load_scenes(write_masks(dir.path())).unwrap();
    let measured = measure_scenes(&scenes);

    let bird = measured
        .iter()
        .find(|m| m.image == "000000000001.jpg")
        .unwrap();
    assert_eq!(bird.pupillary().count(), 0);
    assert!(bird.records.is_empty());
    assert_eq!(bird.individuals.len(), 1);
    assert!(bird.individuals[0].eyes.is_empty());
}

#[test]
fn repeated_runs_are_identical() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_masks(dir.path());

    let scenes = load_scenes(&path).unwrap();
    let first = measure_scenes(&scenes);
    let second = measure_scenes(&scenes);
    assert_eq!(first, second);

    let reloaded = measure_scenes(&load_scenes(&path).unwrap());
    assert_eq!(first, reloaded);
}

#[test]
fn eye_pass_then_measure() {
    let json = r#"{"x.jpg": {"width": 100, "height": 100, "objects": [
        {"object_id": 0, "class": "cat", "bbox": [0, 0, 100, 100]}
    ]}}"#;
    let body_only = Document::from_reader(json.as_bytes()).unwrap();
    assert!(measure_scenes(&body_only.scenes(Path::new(".")))[0]
        .records
        .is_empty());

    let enriched = body_only.with_eye_masks(|_, _| {
        vec![
            serde_json::from_str("[[10,10],[14,10],[14,14],[10,14]]").unwrap(),
            serde_json::from_str("[[40,10],[44,10],[44,14],[40,14]]").unwrap(),
        ]
    });
    let measured = measure_scenes(&enriched.scenes(Path::new(".")));
    assert_eq!(measured[0].records.len(), 1);
    assert_relative_eq!(measured[0].records[0].distance, 30.0, epsilon = 1e-9);
}

#[test]
fn report_json_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let scenes = load_scenes(write_masks(dir.path())).unwrap();
    let report = Report::measure(&scenes);

    let out = dir.path().join("report.json");
    report.save(&out).unwrap();
    let text = std::fs::read_to_string(&out).unwrap();
    let back: Report = serde_json::from_str(&text).unwrap();
    assert_eq!(back.records().count(), report.records().count());
    assert!(back.verification.is_none());
}

#[test]
fn noisy_image_does_not_block_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("animal_masks.json");
    let json = format!(
        r#"{{
            "good.jpg": {{"width": 200, "height": 200, "objects": [
                {{"object_id": 0, "class": "dog", "bbox": [0, 0, 200, 200],
                  "eyes": [{}, {}]}}
            ]}},
            "noisy.jpg": {{"width": 200, "height": 200, "objects": [
                {{"object_id": 0, "class": "cat", "bbox": [0, 0, 200, 200],
                  "eyes": [{}, {}, {}]}}
            ]}}
        }}"#,
        eye(50, 50),
        eye(90, 50),
        eye(20, 20),
        eye(60, 20),
        eye(100, 20),
    );
    std::fs::write(&path, json).unwrap();

    let measured = measure_scenes(&load_scenes(&path).unwrap());
    assert_eq!(measured.len(), 2);

    assert_eq!(measured[0].image, "good.jpg");
    assert_eq!(measured[0].records.len(), 1);
    assert_relative_eq!(measured[0].records[0].distance, 40.0, epsilon = 1e-9);

    assert_eq!(measured[1].image, "noisy.jpg");
    assert!(measured[1].individuals.is_empty());
    assert!(measured[1].records.is_empty());
}
