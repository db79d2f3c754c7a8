//! Durable counter and store snapshot tests

use clinicstore::{Counter, DbConfig, FileCounter, RecordDb};
use serde_json::json;
use tempfile::TempDir;

#[tokio::test]
async fn test_sequence_survives_restart() {
    let temp_dir = TempDir::new().unwrap();

    {
        let db = RecordDb::open(DbConfig::new().data_dir(temp_dir.path())).await.unwrap();
        let clinics = db.collection("clinic").unwrap();
        for name in ["Sunrise", "Lotus"] {
            clinics
                .create(clinics.document(json!({ "clinicName": name })).unwrap())
                .await
                .unwrap();
        }
    }
    assert!(temp_dir.path().join("counters.json").exists());

    let db = RecordDb::open(DbConfig::new().data_dir(temp_dir.path())).await.unwrap();
    let clinics = db.collection("clinic").unwrap();
    let third = clinics
        .create(clinics.document(json!({ "clinicName": "Smile" })).unwrap())
        .await
        .unwrap();
    assert_eq!(third.business_id(), Some("CLINIC003"));
}

#[tokio::test]
async fn test_flush_and_reload_records() {
    let temp_dir = TempDir::new().unwrap();

    {
        let db = RecordDb::open(DbConfig::new().data_dir(temp_dir.path())).await.unwrap();
        let patients = db.collection("patient").unwrap();
        patients
            .create(
                patients
                    .document(json!({ "patientId": "PAT-DURA01", "fullName": "Asha", "phone": "555-0101" }))
                    .unwrap(),
            )
            .await
            .unwrap();
        db.flush().await.unwrap();
    }

    let db = RecordDb::open(DbConfig::new().data_dir(temp_dir.path())).await.unwrap();
    let patients = db.collection("patient").unwrap();
    assert_eq!(patients.count().await.unwrap(), 1);

    // The uniqueness index is rebuilt from the snapshot.
    let err = patients
        .create(
            patients
                .document(json!({ "patientId": "PAT-DURA01", "fullName": "Dup", "phone": "555-0199" }))
                .unwrap(),
        )
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn test_counter_file_is_plain_json() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("counters.json");

    let counter = FileCounter::open(&path).unwrap();
    counter.next("clinic_sequence").await.unwrap();
    counter.next("clinic_sequence").await.unwrap();
    counter.next("doctor_sequence").await.unwrap();

    let on_disk: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(on_disk, json!({ "clinic_sequence": 2, "doctor_sequence": 1 }));
}
