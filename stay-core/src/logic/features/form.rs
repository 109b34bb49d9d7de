//! Form Catalogue
//!
//! Option lists offered by the admission form, in a serializable shape for
//! the server's form page and options endpoint.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::logic::config::BucketingProfile;

/// Inclusive integer range rendered as a slider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntRange {
    pub min: i64,
    pub max: i64,
}

impl IntRange {
    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Every option list of the admission form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormOptions {
    pub hospital: IntRange,
    pub hospital_type: IntRange,
    pub hospital_city: Vec<i64>,
    pub hospital_region: Vec<i64>,
    pub extra_rooms: Vec<String>,
    pub department: Vec<String>,
    pub ward_type: Vec<String>,
    pub ward_facility: Vec<String>,
    pub bed_grade: Vec<f64>,
    pub admission_type: Vec<String>,
    pub illness_severity: Vec<String>,
    pub visitors: Vec<String>,
    /// Slider range for numeric age
    pub age: IntRange,
    /// Band choices when age arrives pre-banded
    pub age_bands: Vec<String>,
}

fn strings(options: &[&str]) -> Vec<String> {
    options.iter().map(|s| s.to_string()).collect()
}

impl FormOptions {
    pub fn current() -> Self {
        Self {
            hospital: IntRange { min: HOSPITAL_MIN, max: HOSPITAL_MAX },
            hospital_type: IntRange { min: HOSPITAL_TYPE_MIN, max: HOSPITAL_TYPE_MAX },
            hospital_city: HOSPITAL_CITY_OPTIONS.to_vec(),
            hospital_region: HOSPITAL_REGION_OPTIONS.to_vec(),
            extra_rooms: strings(EXTRA_ROOMS_OPTIONS),
            department: strings(DEPARTMENT_OPTIONS),
            ward_type: strings(WARD_TYPE_OPTIONS),
            ward_facility: strings(WARD_FACILITY_OPTIONS),
            bed_grade: BED_GRADE_OPTIONS.to_vec(),
            admission_type: strings(ADMISSION_OPTIONS),
            illness_severity: strings(SEVERITY_OPTIONS),
            visitors: strings(VISITORS_OPTIONS),
            age: IntRange { min: AGE_MIN, max: AGE_MAX },
            age_bands: strings(AGE_BAND_OPTIONS),
        }
    }

    /// Whether the form collects age as a number or as a band
    pub fn age_is_banded(profile: BucketingProfile) -> bool {
        profile == BucketingProfile::VariantB
    }
}

impl Default for FormOptions {
    fn default() -> Self {
        Self::current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_options() {
        let options = FormOptions::current();
        assert!(options.hospital.contains(1));
        assert!(options.hospital.contains(32));
        assert!(!options.hospital.contains(33));
        assert_eq!(options.hospital_city.len(), 11);
        assert!(!options.hospital_city.contains(&8));
        assert_eq!(options.extra_rooms.last().map(String::as_str), Some("5 or more"));
        assert!(options.age.contains(0) && options.age.contains(100));
    }

    #[test]
    fn test_age_is_banded() {
        assert!(!FormOptions::age_is_banded(BucketingProfile::VariantA));
        assert!(FormOptions::age_is_banded(BucketingProfile::VariantB));
    }
}
