/*!
 * Disease alert modal content.
 *
 * The disease-info and outbreak modals are filled from the disease alert API.
 * While a request is pending the body shows a spinner; failures replace it with
 * an error alert.
 */

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::html::{display_value, escape_html, list_items, title_case_key};

/// Disease description returned by `/api/disease-alerts/info`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiseaseInfo {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub prevention: Vec<String>,
    #[serde(default)]
    pub treatment: Option<String>,
    /// Weather condition per risk factor, keyed in snake case
    #[serde(default)]
    pub risk_factors: Option<Map<String, Value>>,
    #[serde(default)]
    pub zoonotic: bool,
}

/// Outbreak counters; any of them may be missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutbreakStatistics {
    #[serde(default)]
    pub affected_animals: Option<Value>,
    #[serde(default)]
    pub deaths: Option<Value>,
    #[serde(default)]
    pub morbidity_rate: Option<Value>,
    #[serde(default)]
    pub mortality_rate: Option<Value>,
}

/// Outbreak record returned by `/api/disease-alerts/outbreak/<id>`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutbreakDetails {
    #[serde(default)]
    pub disease_name: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub reported_date: String,
    /// Distance from the farm in km
    #[serde(default)]
    pub distance: Value,
    #[serde(default)]
    pub statistics: Option<OutbreakStatistics>,
    #[serde(default)]
    pub preventive_measures: Vec<String>,
    #[serde(default)]
    pub details: Option<String>,
}

impl OutbreakDetails {
    /// Modal title for this outbreak
    pub fn title(&self) -> String {
        format!("{} Outbreak Details", self.disease_name)
    }
}

/// Spinner body shown while `subject` is loading, e.g. "disease information"
pub fn render_loading(subject: &str) -> String {
    format!(
        "<div class=\"text-center py-5\"><div class=\"spinner-border text-primary\" role=\"status\"><span class=\"visually-hidden\">Loading...</span></div><p class=\"mt-3\">Loading {}...</p></div>",
        escape_html(subject)
    )
}

/// Error body replacing the spinner when loading `subject` failed
pub fn render_load_error(subject: &str, error: &str) -> String {
    format!(
        "<div class=\"alert alert-danger\"><i class=\"fas fa-exclamation-circle me-2\"></i>Error loading {}: {}. Please try again later.</div>",
        escape_html(subject),
        escape_html(error)
    )
}

fn titled_list(column: &str, title: &str, items: &[String]) -> String {
    format!(
        "<div class=\"{} mb-4\"><h5>{}</h5><ul class=\"list-group list-group-flush\">{}</ul></div>",
        column,
        title,
        list_items(items)
    )
}

/// Body of the disease-info modal
pub fn render_disease_info(info: &DiseaseInfo) -> String {
    let mut html = String::from("<div class=\"row\">");

    html.push_str(&format!(
        "<div class=\"col-12 mb-4\"><h5>Description</h5><p>{}</p></div>",
        escape_html(&info.description)
    ));

    if !info.symptoms.is_empty() {
        html.push_str(&titled_list("col-md-6", "Symptoms", &info.symptoms));
    }
    if !info.prevention.is_empty() {
        html.push_str(&titled_list("col-md-6", "Prevention", &info.prevention));
    }

    if let Some(treatment) = info.treatment.as_deref().filter(|t| !t.is_empty()) {
        html.push_str(&format!(
            "<div class=\"col-12 mb-4\"><h5>Treatment</h5><p>{}</p></div>",
            escape_html(treatment)
        ));
    }

    if let Some(factors) = &info.risk_factors {
        html.push_str("<div class=\"col-12 mb-4\"><h5>Weather Risk Factors</h5><div class=\"table-responsive\"><table class=\"table table-sm table-bordered\">");
        html.push_str("<thead class=\"table-light\"><tr><th>Factor</th><th>Risk Condition</th></tr></thead><tbody>");
        for (key, value) in factors {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                escape_html(&title_case_key(key)),
                escape_html(&display_value(value))
            ));
        }
        html.push_str("</tbody></table></div></div>");
    }

    if info.zoonotic {
        html.push_str("<div class=\"col-12\"><div class=\"alert alert-danger\"><i class=\"fas fa-exclamation-triangle me-2\"></i><strong>Warning:</strong> This is a zoonotic disease that can be transmitted to humans.</div></div>");
    }

    html.push_str("</div>");
    html
}

fn detail_item(label: &str, value: &str) -> String {
    format!(
        "<li class=\"list-group-item d-flex justify-content-between\"><span>{}:</span> <strong>{}</strong></li>",
        label,
        escape_html(value)
    )
}

/// JSON truthiness: absent, null, false, zero and empty strings are skipped
fn truthy(value: &Option<Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => None,
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(other) => Some(display_value(other)),
    }
}

/// Body of the outbreak modal
pub fn render_outbreak(outbreak: &OutbreakDetails) -> String {
    let mut html = String::from("<div class=\"row\">");

    html.push_str("<div class=\"col-md-6 mb-4\"><h5>Basic Information</h5><ul class=\"list-group list-group-flush\">");
    html.push_str(&detail_item("Disease", &outbreak.disease_name));
    html.push_str(&detail_item("Severity", &outbreak.severity));
    html.push_str(&detail_item("Location", &outbreak.location));
    html.push_str(&detail_item("District", &outbreak.district));
    html.push_str(&detail_item("State", &outbreak.state));
    html.push_str(&detail_item("Reported Date", &outbreak.reported_date));
    html.push_str(&detail_item("Distance from Farm", &format!("{} km", display_value(&outbreak.distance))));
    html.push_str("</ul></div>");

    if let Some(stats) = &outbreak.statistics {
        html.push_str("<div class=\"col-md-6 mb-4\"><h5>Outbreak Statistics</h5><ul class=\"list-group list-group-flush\">");
        if let Some(affected) = truthy(&stats.affected_animals) {
            html.push_str(&detail_item("Affected Animals", &affected));
        }
        if let Some(deaths) = truthy(&stats.deaths) {
            html.push_str(&detail_item("Deaths", &deaths));
        }
        if let Some(rate) = truthy(&stats.morbidity_rate) {
            html.push_str(&detail_item("Morbidity Rate", &format!("{}%", rate)));
        }
        if let Some(rate) = truthy(&stats.mortality_rate) {
            html.push_str(&detail_item("Mortality Rate", &format!("{}%", rate)));
        }
        html.push_str("</ul></div>");
    }

    if !outbreak.preventive_measures.is_empty() {
        html.push_str(&titled_list("col-12", "Preventive Measures", &outbreak.preventive_measures));
    }

    if let Some(details) = outbreak.details.as_deref().filter(|d| !d.is_empty()) {
        html.push_str(&format!(
            "<div class=\"col-12 mb-4\"><h5>Additional Details</h5><p>{}</p></div>",
            escape_html(details)
        ));
    }

    html.push_str("</div>");
    html
}
