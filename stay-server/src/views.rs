//! HTML views for the admission form

use std::fmt::Write;

use stay_core::constants::{APP_NAME, APP_VERSION};
use stay_core::{DroppedIndicator, FormOptions};

/// Minimal HTML escaping for text and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn select<T: ToString>(html: &mut String, name: &str, label: &str, options: &[T]) {
    let _ = write!(html, "<label>{}<select name=\"{}\">", escape(label), name);
    for option in options {
        let value = escape(&option.to_string());
        let _ = write!(html, "<option value=\"{0}\">{0}</option>", value);
    }
    html.push_str("</select></label>\n");
}

fn slider(html: &mut String, name: &str, label: &str, min: i64, max: i64) {
    let _ = write!(
        html,
        "<label>{} <input type=\"number\" name=\"{}\" min=\"{}\" max=\"{}\" value=\"{}\" required></label>\n",
        escape(label),
        name,
        min,
        max,
        min
    );
}

fn page(body: &str) -> String {
    format!(
        "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n{body}\n<footer><small>{title} v{version}</small></footer>\n</body></html>\n",
        title = APP_NAME,
        version = APP_VERSION,
        body = body
    )
}

/// The admission form
pub fn render_form(options: &FormOptions, age_is_banded: bool) -> String {
    let mut html = String::new();
    html.push_str("<h1>Hospital Stay Length Prediction</h1>\n");
    html.push_str("<p>Enter the patient &amp; hospital details, then click <b>Predict</b>.</p>\n");
    html.push_str("<form method=\"post\" action=\"/predict\">\n");

    html.push_str("<h2>Hospital Info</h2>\n");
    slider(&mut html, "hospital", "Hospital", options.hospital.min, options.hospital.max);
    slider(
        &mut html,
        "hospital_type",
        "Hospital Type",
        options.hospital_type.min,
        options.hospital_type.max,
    );
    select(&mut html, "hospital_city", "Hospital City", &options.hospital_city);
    select(&mut html, "hospital_region", "Hospital Region", &options.hospital_region);

    html.push_str("<h2>Facility &amp; Admission</h2>\n");
    select(&mut html, "extra_rooms", "Number of Available Extra Rooms in Hospital", &options.extra_rooms);
    select(&mut html, "department", "Hospital Department", &options.department);
    select(&mut html, "ward_type", "Ward Type", &options.ward_type);
    select(&mut html, "ward_facility", "Ward Facility", &options.ward_facility);
    let bed_grades: Vec<String> = options.bed_grade.iter().map(|g| format!("{:.1}", g)).collect();
    select(&mut html, "bed_grade", "Bed Grade", &bed_grades);
    select(&mut html, "admission_type", "Type of Admission", &options.admission_type);

    html.push_str("<h2>Patient Info</h2>\n");
    select(&mut html, "illness_severity", "Illness Severity", &options.illness_severity);
    select(&mut html, "visitors", "Number of Patient Visitors", &options.visitors);
    if age_is_banded {
        select(&mut html, "age", "Age", &options.age_bands);
    } else {
        slider(&mut html, "age", "Age (0-100)", options.age.min, options.age.max);
    }

    html.push_str("<button type=\"submit\">Predict</button>\n</form>\n");
    page(&html)
}

/// Successful prediction
pub fn render_prediction(label: &str, dropped: &[DroppedIndicator]) -> String {
    let mut html = format!("<p class=\"success\">Prediction: <b>{}</b></p>\n", escape(label));
    if !dropped.is_empty() {
        html.push_str("<p class=\"note\">Values the model never saw in training (ignored):</p>\n<ul>\n");
        for d in dropped {
            let _ = writeln!(html, "<li>{} = {}</li>", escape(&d.field), escape(&d.value));
        }
        html.push_str("</ul>\n");
    }
    html.push_str(
        "<p><small>The model has a lower recall for stays of 31 days or more, \
         so long stays are more likely to be missed.</small></p>\n",
    );
    html.push_str("<p><a href=\"/\">New prediction</a></p>\n");
    page(&html)
}

/// Failed prediction or rejected form; never shows a label
pub fn render_failure(message: &str, detail: &str) -> String {
    let html = format!(
        "<p class=\"error\">{}</p>\n<pre>{}</pre>\n<p><a href=\"/\">Back to the form</a></p>\n",
        escape(message),
        escape(detail)
    );
    page(&html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("TB & Chest <b>"), "TB &amp; Chest &lt;b&gt;");
        assert_eq!(escape("\"x\"'"), "&quot;x&quot;&#39;");
    }

    #[test]
    fn test_form_lists_options() {
        let html = render_form(&FormOptions::current(), false);
        assert!(html.contains("name=\"department\""));
        assert!(html.contains("<option value=\"TB &amp; Chest disease\">"));
        assert!(html.contains("<option value=\"2.0\">"));
        assert!(html.contains("type=\"number\" name=\"age\" min=\"0\" max=\"100\""));
    }

    #[test]
    fn test_banded_age_form() {
        let html = render_form(&FormOptions::current(), true);
        assert!(html.contains("<option value=\"91-100\">"));
    }

    #[test]
    fn test_failure_has_no_label() {
        let html = render_failure("Prediction failed.", "field 'Hospital' missing");
        assert!(!html.contains("Prediction: <b>"));
        assert!(html.contains("field &#39;Hospital&#39; missing"));
    }
}
