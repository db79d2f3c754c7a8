//! Built-in kind tables for the clinic resources.

use crate::allocator::IdentityStrategy;
use crate::config::KindConfig;
use crate::storage::KindSchema;

pub const CLINIC: &str = "clinic";
pub const PATIENT: &str = "patient";
pub const DOCTOR: &str = "doctor";
pub const MEDICINE: &str = "medicine";
pub const PRESCRIPTION: &str = "prescription";
pub const DOCTOR_AVAILABILITY: &str = "doctor_availability";
pub const MEDICAL_TEST: &str = "medical_test";

pub fn all() -> Vec<KindConfig> {
    vec![
        clinic(),
        patient(),
        doctor(),
        medicine(),
        prescription(),
        doctor_availability(),
        medical_test(),
    ]
}

/// Clinics get `CLINIC001`, `CLINIC002`, ... from `clinic_sequence`.
pub fn clinic() -> KindConfig {
    let schema = KindSchema::new(CLINIC)
        .business_id_field("clinicId")
        .exact_id("clinicId")
        .substring("clinicName", "clinicName")
        .exact("clinicType", "clinicType")
        .exact("status", "status")
        .list_contains("service", "services")
        .substring("city", "address.city")
        .sort_text("clinicName", "clinicName")
        .sort_text("clinicType", "clinicType")
        .sort_text("status", "status")
        .sort_text("createdAt", "audit.createdAt");

    KindConfig::new(schema)
        .strategy(IdentityStrategy::sequential("clinic_sequence", "CLINIC", 3))
        .require("clinicName")
        .audited()
}

/// Patients get `PAT-` plus six random characters unless they bring an id.
pub fn patient() -> KindConfig {
    let schema = KindSchema::new(PATIENT)
        .business_id_field("patientId")
        .exact_id("patientId")
        .substring("name", "fullName")
        .list_contains("allergy", "allergies")
        .list_contains("chronicDisease", "chronicDiseases")
        .exact("bloodGroup", "bloodGroup")
        .exact("gender", "gender")
        .substring("phoneContains", "phone")
        .range("dateOfBirth", "dateOfBirth")
        .sort_text("fullName", "fullName")
        .sort_date("dateOfBirth", "dateOfBirth")
        .sort_numeric("height", "height")
        .sort_numeric("weight", "weight");

    KindConfig::new(schema)
        .strategy(IdentityStrategy::random("PAT-", 6))
        .require("fullName")
        .require("phone")
}

pub fn doctor() -> KindConfig {
    let schema = KindSchema::new(DOCTOR)
        .business_id_field("doctorId")
        .exact_id("doctorId")
        .substring("name", "name")
        .substring("specialization", "specialization")
        .range("experience", "experience")
        .list_contains_exact("qualification", "qualification")
        .exact("gender", "gender")
        .substring("hospitalName", "hospitalName")
        .range("fee", "consultationFee")
        .exact("availability", "availability")
        .substring("address", "address")
        .sort_text("name", "name")
        .sort_text("specialization", "specialization")
        .sort_numeric("experience", "experience")
        .sort_numeric("fee", "consultationFee");

    KindConfig::new(schema).require("name")
}

pub fn medicine() -> KindConfig {
    let schema = KindSchema::new(MEDICINE)
        .business_id_field("medId")
        .exact_id("medId")
        .substring("name", "name")
        .substring("company", "companyName")
        .exact("status", "recordStatus")
        .flag("doctorChangeAllowed", "doctorChangeAllowed")
        .range("price", "price")
        .sort_text("name", "name")
        .sort_numeric("price", "price")
        .sort_date("expiryDate", "expiryDate");

    KindConfig::new(schema).require("name")
}

/// Prescriptions nest patient, doctor and diagnosis blocks and carry a list
/// of medication records.
pub fn prescription() -> KindConfig {
    let schema = KindSchema::new(PRESCRIPTION)
        .exact("patientId", "patient.patientId")
        .exact("doctorId", "currentDoctor.doctorId")
        .substring("doctorName", "currentDoctor.fullName")
        .substring("diagnosis", "diagnosis.confirmedDiagnosis")
        .exact("severity", "diagnosis.severity")
        .list_contains("medicine", "medications.medicineName")
        .exact("status", "recordStatus")
        .exact("treatmentStatus", "treatmentTimeline.treatmentStatus")
        .flag("doctorChangeAllowed", "doctorChangeAllowed")
        .sort_text("status", "recordStatus")
        .sort_date("treatmentStartDate", "treatmentTimeline.treatmentStartDate")
        .sort_text("createdAt", "audit.createdAt");

    KindConfig::new(schema)
        .require("patient.patientId")
        .default_value("recordStatus", "ACTIVE")
        .audited()
}

pub fn doctor_availability() -> KindConfig {
    let schema = KindSchema::new(DOCTOR_AVAILABILITY)
        .exact("doctorId", "doctorId")
        .exact("day", "day")
        .flag("isAvailable", "available")
        .sort_text("day", "day")
        .sort_text("startTime", "startTime");

    KindConfig::new(schema)
        .require("doctorId")
        .require("day")
}

pub fn medical_test() -> KindConfig {
    let schema = KindSchema::new(MEDICAL_TEST)
        .exact("patientId", "patientId")
        .exact("doctorId", "doctorId")
        .substring("testName", "testName")
        .exact("category", "category")
        .exact("resultStatus", "resultStatus")
        .range("price", "price")
        .sort_text("testName", "testName")
        .sort_numeric("price", "price");

    KindConfig::new(schema)
        .require("testName")
        .default_value("resultStatus", "Pending")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::MatcherKind;

    #[test]
    fn test_kind_names_are_unique() {
        let mut names: Vec<String> = all().iter().map(|c| c.kind().to_string()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 7);
    }

    #[test]
    fn test_identity_strategies() {
        assert_eq!(
            clinic().strategy,
            IdentityStrategy::sequential("clinic_sequence", "CLINIC", 3)
        );
        assert_eq!(patient().strategy, IdentityStrategy::random("PAT-", 6));
        assert_eq!(medicine().strategy, IdentityStrategy::Manual);
    }

    #[test]
    fn test_doctor_qualification_is_exact_list_match() {
        let doctor = doctor();
        assert_eq!(
            doctor.schema.find_filter("qualification").unwrap().matcher,
            MatcherKind::ListContains { exact: true }
        );
        assert_eq!(doctor.schema.find_filter("fee").unwrap().matcher, MatcherKind::Range);
    }
}
