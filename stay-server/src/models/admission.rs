//! Admission form model

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use stay_core::constants::*;
use stay_core::{BucketingProfile, Field, FieldValue, RawRecord};

/// One admission as submitted by the form or the JSON API.
///
/// Every field is optional: a field left out stays out of the record and
/// the pipeline decides whether the model can do without it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct AdmissionForm {
    #[validate(range(min = 1, max = 32))]
    pub hospital: Option<i64>,

    #[validate(range(min = 0, max = 6))]
    pub hospital_type: Option<i64>,

    pub hospital_city: Option<i64>,

    pub hospital_region: Option<i64>,

    pub extra_rooms: Option<String>,

    pub department: Option<String>,

    pub ward_type: Option<String>,

    pub ward_facility: Option<String>,

    #[validate(range(min = 1.0, max = 4.0))]
    pub bed_grade: Option<f64>,

    pub admission_type: Option<String>,

    pub illness_severity: Option<String>,

    pub visitors: Option<String>,

    /// Number (0-100) or a band such as "21-30", depending on the profile
    pub age: Option<FieldValue>,
}

fn one_of_error(value: String, allowed: String) -> ValidationError {
    let mut error = ValidationError::new("one_of");
    error.message = Some(Cow::from(format!("'{}' is not one of: {}", value, allowed)));
    error
}

fn check_text(errors: &mut ValidationErrors, field: &'static str, value: &Option<String>, allowed: &[&str]) {
    if let Some(value) = value {
        if !allowed.contains(&value.as_str()) {
            errors.add(field, one_of_error(value.clone(), allowed.join(", ")));
        }
    }
}

fn check_int(errors: &mut ValidationErrors, field: &'static str, value: Option<i64>, allowed: &[i64]) {
    if let Some(value) = value {
        if !allowed.contains(&value) {
            let allowed = allowed.iter().map(i64::to_string).collect::<Vec<_>>().join(", ");
            errors.add(field, one_of_error(value.to_string(), allowed));
        }
    }
}

impl AdmissionForm {
    /// Validate ranges and enumerated domains
    pub fn check(&self, profile: BucketingProfile) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        check_int(&mut errors, "hospital_city", self.hospital_city, HOSPITAL_CITY_OPTIONS);
        check_int(&mut errors, "hospital_region", self.hospital_region, HOSPITAL_REGION_OPTIONS);
        check_text(&mut errors, "extra_rooms", &self.extra_rooms, EXTRA_ROOMS_OPTIONS);
        check_text(&mut errors, "department", &self.department, DEPARTMENT_OPTIONS);
        check_text(&mut errors, "ward_facility", &self.ward_facility, WARD_FACILITY_OPTIONS);
        check_text(&mut errors, "admission_type", &self.admission_type, ADMISSION_OPTIONS);
        check_text(&mut errors, "illness_severity", &self.illness_severity, SEVERITY_OPTIONS);
        check_text(&mut errors, "visitors", &self.visitors, VISITORS_OPTIONS);

        // Raw ward letters are accepted too; bucketing folds P, T and U
        let ward_types: Vec<&str> = WARD_TYPE_OPTIONS
            .iter()
            .copied()
            .chain(["P", "T", "U"])
            .collect();
        check_text(&mut errors, "ward_type", &self.ward_type, &ward_types);

        if let Some(age) = &self.age {
            match profile {
                BucketingProfile::VariantA => {
                    let in_range = age.as_i64().is_some_and(|v| (AGE_MIN..=AGE_MAX).contains(&v));
                    if !in_range {
                        let mut error = ValidationError::new("range");
                        error.message = Some(Cow::from(format!(
                            "age must be a whole number between {} and {}, got '{}'",
                            AGE_MIN, AGE_MAX, age
                        )));
                        errors.add("age", error);
                    }
                }
                BucketingProfile::VariantB => {
                    let band = Some(age.render());
                    check_text(&mut errors, "age", &band, AGE_BAND_OPTIONS);
                }
            }
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Raw record keyed by training column names
    pub fn to_record(&self) -> RawRecord {
        let mut record = RawRecord::new();
        let mut put = |field: Field, value: Option<FieldValue>| {
            if let Some(value) = value {
                record.set(field, value);
            }
        };

        put(Field::Hospital, self.hospital.map(FieldValue::Int));
        put(Field::HospitalType, self.hospital_type.map(FieldValue::Int));
        put(Field::HospitalCity, self.hospital_city.map(FieldValue::Int));
        put(Field::HospitalRegion, self.hospital_region.map(FieldValue::Int));
        put(Field::ExtraRooms, self.extra_rooms.clone().map(FieldValue::Text));
        put(Field::Department, self.department.clone().map(FieldValue::Text));
        put(Field::WardType, self.ward_type.clone().map(FieldValue::Text));
        put(Field::WardFacility, self.ward_facility.clone().map(FieldValue::Text));
        put(Field::BedGrade, self.bed_grade.map(FieldValue::Float));
        put(Field::AdmissionType, self.admission_type.clone().map(FieldValue::Text));
        put(Field::IllnessSeverity, self.illness_severity.clone().map(FieldValue::Text));
        put(Field::Visitors, self.visitors.clone().map(FieldValue::Text));
        put(Field::Age, self.age.clone());

        record
    }
}
