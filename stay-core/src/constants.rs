//! Central Constants
//!
//! Single source of truth for the admission form domain, bucket labels and
//! the fallback label convention of the shipped model.

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Hospital Stay Predictor";

/// Default model bundle directory
pub const DEFAULT_BUNDLE_DIR: &str = "./model";

/// Bundle manifest file name inside the bundle directory
pub const BUNDLE_MANIFEST: &str = "bundle.json";

// ============================================================================
// FORM DOMAIN (option lists offered by the admission form)
// ============================================================================

pub const HOSPITAL_MIN: i64 = 1;
pub const HOSPITAL_MAX: i64 = 32;

pub const HOSPITAL_TYPE_MIN: i64 = 0;
pub const HOSPITAL_TYPE_MAX: i64 = 6;

pub const HOSPITAL_CITY_OPTIONS: &[i64] = &[1, 2, 3, 4, 5, 6, 7, 9, 10, 11, 13];

pub const HOSPITAL_REGION_OPTIONS: &[i64] = &[0, 1, 2];

pub const EXTRA_ROOMS_OPTIONS: &[&str] = &["0", "1", "2", "3", "4", "5 or more"];

pub const DEPARTMENT_OPTIONS: &[&str] = &[
    "radiotherapy",
    "anesthesia",
    "gynecology",
    "TB & Chest disease",
    "surgery",
];

pub const WARD_TYPE_OPTIONS: &[&str] = &["R", "S", "Q", "Other Ward Types (P, T, U)"];

pub const WARD_FACILITY_OPTIONS: &[&str] = &["A", "B", "C", "D", "E", "F"];

pub const BED_GRADE_OPTIONS: &[f64] = &[1.0, 2.0, 3.0, 4.0];

pub const ADMISSION_OPTIONS: &[&str] = &["Emergency", "Trauma", "Urgent"];

pub const SEVERITY_OPTIONS: &[&str] = &["Extreme", "Moderate", "Minor"];

pub const VISITORS_OPTIONS: &[&str] = &["0", "1", "2", "3", "4", "5 or more"];

pub const AGE_MIN: i64 = 0;
pub const AGE_MAX: i64 = 100;

/// Pre-banded age values accepted by the banded-age profile
pub const AGE_BAND_OPTIONS: &[&str] = &[
    "0-10", "11-20", "21-30", "31-40", "41-50", "51-60", "61-70", "71-80", "81-90", "91-100",
];

// ============================================================================
// BUCKET LABELS
// ============================================================================

pub const ROOMS_LOW: &str = "0-2 rooms";
pub const ROOMS_THREE: &str = "3 rooms";
pub const ROOMS_FOUR: &str = "4 rooms";
pub const ROOMS_MANY: &str = "5 or more rooms";

pub const VISITORS_LOW: &str = "0-2 visitors";
pub const VISITORS_THREE: &str = "3 visitors";
pub const VISITORS_FOUR: &str = "4 visitors";
pub const VISITORS_MANY: &str = "5 or more visitors";

pub const WARD_TYPE_OTHER: &str = "Other Ward Types (P, T, U)";

pub const DEPARTMENT_MERGED: &str = "TB & Chest disease + surgery";

// ============================================================================
// FALLBACK LABELS
// ============================================================================

/// Class index that the shipped model uses for long stays
pub const LONG_STAY_CLASS: i64 = 1;

/// Label for [`LONG_STAY_CLASS`] when the bundle carries no label classes
pub const LONG_STAY_LABEL: &str = "31 days or more";

/// Label for every other class when the bundle carries no label classes
pub const SHORT_STAY_LABEL: &str = "30 days or less";
