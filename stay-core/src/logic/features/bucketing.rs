//! Feature Bucketing
//!
//! Collapses raw form values into the coarser categories the model was
//! trained on. Every rule is total: exact matches first, then a default
//! branch, so bucketing never fails.

use crate::constants::{
    DEPARTMENT_MERGED, ROOMS_FOUR, ROOMS_LOW, ROOMS_MANY, ROOMS_THREE, VISITORS_FOUR,
    VISITORS_LOW, VISITORS_MANY, VISITORS_THREE, WARD_TYPE_OTHER,
};
use crate::logic::config::{AgeBanding, BucketingProfile};

use super::record::{BucketedRecord, Field, FieldValue, RawRecord};

// ============================================================================
// PER-FIELD RULES
// ============================================================================

/// Exact-match key for count-like fields ("0".."4", "5 or more").
/// Text is matched as submitted, so " 3" is not "3".
fn count_key(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Text(s) => Some(s.clone()),
        FieldValue::Int(v) => Some(v.to_string()),
        FieldValue::Float(v) if v.fract() == 0.0 && v.is_finite() => Some((*v as i64).to_string()),
        FieldValue::Float(_) => None,
    }
}

/// `Available_Extra_Rooms_in_Hospital`
pub fn combine_extra_rooms(value: &FieldValue) -> FieldValue {
    let label = match count_key(value).as_deref() {
        Some("0" | "1" | "2") => ROOMS_LOW,
        Some("3") => ROOMS_THREE,
        Some("4") => ROOMS_FOUR,
        _ => ROOMS_MANY,
    };
    FieldValue::text(label)
}

/// `Patient_Visitors`
pub fn combine_visitors(value: &FieldValue) -> FieldValue {
    let label = match count_key(value).as_deref() {
        Some("0" | "1" | "2") => VISITORS_LOW,
        Some("3") => VISITORS_THREE,
        Some("4") => VISITORS_FOUR,
        _ => VISITORS_MANY,
    };
    FieldValue::text(label)
}

/// `Ward_Type`: the rare P, T and U wards share one bucket
pub fn combine_ward_type(value: &FieldValue) -> FieldValue {
    match value {
        FieldValue::Text(s) if matches!(s.as_str(), "P" | "T" | "U") => {
            FieldValue::text(WARD_TYPE_OTHER)
        }
        other => other.clone(),
    }
}

/// `Department`: TB & Chest disease and surgery share one bucket
pub fn combine_departments(value: &FieldValue) -> FieldValue {
    match value {
        FieldValue::Text(s) if matches!(s.as_str(), "TB & Chest disease" | "surgery") => {
            FieldValue::text(DEPARTMENT_MERGED)
        }
        other => other.clone(),
    }
}

/// `Bed_Grade` is a float domain: `2` and `"2"` both become level `2.0`
pub fn grade_as_float(value: &FieldValue) -> FieldValue {
    match value.as_f64() {
        Some(grade) if grade.is_finite() => FieldValue::Float(grade),
        _ => value.clone(),
    }
}

/// Numeric `Age` → inclusive decade band.
///
/// Below 0 clamps into "0-20", above 100 into "81-100". Text that is not a
/// finite number is left as submitted.
pub fn band_age_decades(value: &FieldValue) -> FieldValue {
    let Some(age) = value.as_f64().filter(|age| age.is_finite()) else {
        return value.clone();
    };

    let label = if age <= 20.0 {
        "0-20"
    } else if age <= 30.0 {
        "21-30"
    } else if age <= 40.0 {
        "31-40"
    } else if age <= 50.0 {
        "41-50"
    } else if age <= 60.0 {
        "51-60"
    } else if age <= 70.0 {
        "61-70"
    } else if age <= 80.0 {
        "71-80"
    } else {
        "81-100"
    };
    FieldValue::text(label)
}

/// Numeric `Age` under the collapsed rule set: everything is "0-20"
pub fn band_age_source_compatible(_value: &FieldValue) -> FieldValue {
    FieldValue::text("0-20")
}

/// Pre-banded `Age`: the outer ten-year bands merge into twenty-year ones
pub fn merge_age_bands(value: &FieldValue) -> FieldValue {
    match value {
        FieldValue::Text(s) => match s.as_str() {
            "0-10" | "11-20" => FieldValue::text("0-20"),
            "81-90" | "91-100" => FieldValue::text("81-100"),
            _ => value.clone(),
        },
        other => other.clone(),
    }
}

// ============================================================================
// BUCKETER
// ============================================================================

/// Applies the per-field rules of one profile to a whole record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bucketer {
    profile: BucketingProfile,
    age_banding: AgeBanding,
}

impl Bucketer {
    pub fn new(profile: BucketingProfile, age_banding: AgeBanding) -> Self {
        Self { profile, age_banding }
    }

    pub fn profile(&self) -> BucketingProfile {
        self.profile
    }

    pub fn age_banding(&self) -> AgeBanding {
        self.age_banding
    }

    /// Bucket label for one field, or `None` when the field is not bucketed
    /// under this profile
    pub fn bucket_field(&self, field: Field, value: &FieldValue) -> Option<FieldValue> {
        match (field, self.profile) {
            (Field::ExtraRooms, _) => Some(combine_extra_rooms(value)),
            (Field::Visitors, _) => Some(combine_visitors(value)),
            (Field::WardType, _) => Some(combine_ward_type(value)),
            (Field::BedGrade, _) => Some(grade_as_float(value)),
            (Field::Department, BucketingProfile::VariantA) => Some(combine_departments(value)),
            (Field::Age, BucketingProfile::VariantA) => Some(match self.age_banding {
                AgeBanding::Decades => band_age_decades(value),
                AgeBanding::SourceCompatible => band_age_source_compatible(value),
            }),
            (Field::Age, BucketingProfile::VariantB) => Some(merge_age_bands(value)),
            _ => None,
        }
    }

    /// Bucket every recognised field; absent fields stay absent and
    /// unrecognised fields are copied unchanged.
    pub fn bucket(&self, record: &RawRecord) -> BucketedRecord {
        record
            .iter()
            .map(|(name, value)| {
                let bucketed = Field::from_column_name(name)
                    .and_then(|field| self.bucket_field(field, value))
                    .unwrap_or_else(|| value.clone());
                (name, bucketed)
            })
            .collect()
    }
}
