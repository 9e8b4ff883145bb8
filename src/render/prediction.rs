/*!
 * Prediction result rendering.
 *
 * Turns the JSON returned by the breed and disease prediction endpoints into
 * the result cards and alerts shown below the upload form. Every value coming
 * from the server is escaped before interpolation.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::html::{display_value, escape_html, title_case_key};

/// Shown when a prediction request fails without a server message
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again.";

static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[-+]?(\d+\.?\d*|\.\d+)").unwrap());

/// Fields every prediction response may carry, successful or not
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionEnvelope {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub animal_mismatch: bool,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// One alternative disease with its formatted confidence (e.g. `"12.5%"`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedDisease {
    pub disease: String,
    pub confidence: String,
}

/// Successful disease prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseasePrediction {
    pub disease: String,
    /// Formatted confidence, e.g. `"82.0%"`
    pub confidence: String,
    /// Raw confidence in percent
    pub confidence_value: f64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub top_predictions: Vec<RankedDisease>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// One alternative breed with its confidence in percent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedBreed {
    pub breed: String,
    pub confidence: f64,
}

/// Successful breed prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreedPrediction {
    pub breed: String,
    pub confidence: String,
    pub confidence_value: f64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub all_predictions: Vec<RankedBreed>,
    #[serde(default)]
    pub characteristics: Map<String, Value>,
}

/// Bootstrap badge classes for a confidence in percent
pub fn confidence_badge_class(confidence: f64) -> &'static str {
    if confidence >= 70.0 {
        "bg-success"
    } else if confidence >= 40.0 {
        "bg-warning text-dark"
    } else {
        "bg-danger"
    }
}

/// Leading number of a formatted confidence such as `"45.5%"`
pub fn parse_confidence(formatted: &str) -> Option<f64> {
    LEADING_NUMBER
        .find(formatted)
        .and_then(|m| m.as_str().trim().parse().ok())
}

/// Font Awesome classes for a recommendation line
pub fn recommendation_icon(recommendation: &str) -> &'static str {
    let lower = recommendation.to_lowercase();
    if lower.contains("medicine:") {
        "fa-pills text-danger"
    } else if lower.contains("diet:") {
        "fa-utensils text-success"
    } else {
        "fa-check text-primary"
    }
}

fn result_image(image_url: Option<&str>) -> String {
    image_url
        .map(|url| {
            format!(
                "<div class=\"mb-3\"><img src=\"{}\" class=\"img-fluid rounded\" alt=\"Uploaded image\" style=\"max-height: 200px;\"></div>",
                escape_html(url)
            )
        })
        .unwrap_or_default()
}

fn ranked_item(label: &str, badge: &str, confidence: &str) -> String {
    format!(
        "<div class=\"list-group-item d-flex justify-content-between align-items-center\">{}<span class=\"badge {} rounded-pill\">{}</span></div>",
        escape_html(label),
        badge,
        escape_html(confidence)
    )
}

/// Disease result card followed by the recommendations card when there are any
pub fn render_disease_result(result: &DiseasePrediction) -> String {
    let mut html = String::new();

    html.push_str("<div class=\"card mb-4\">");
    html.push_str("<div class=\"card-header bg-primary text-white\"><h5 class=\"mb-0\"><i class=\"fas fa-microscope me-2\"></i>Disease Detection Result</h5></div>");
    html.push_str("<div class=\"card-body\"><div class=\"row\"><div class=\"col-md-4 text-center\">");
    html.push_str(&result_image(result.image_url.as_deref()));
    html.push_str(&format!(
        "<div class=\"disease-result\"><h4>{}</h4><div class=\"confidence-badge {}\">{} Confidence</div></div>",
        escape_html(&result.disease),
        confidence_badge_class(result.confidence_value),
        escape_html(&result.confidence)
    ));
    html.push_str("</div><div class=\"col-md-8\"><h5>Other Possible Diseases:</h5><div class=\"list-group mb-3\">");
    for prediction in &result.top_predictions {
        let badge = confidence_badge_class(parse_confidence(&prediction.confidence).unwrap_or(0.0));
        html.push_str(&ranked_item(&prediction.disease, badge, &prediction.confidence));
    }
    html.push_str("</div><h5>Detected Features:</h5><ul class=\"list-group mb-3\">");
    if result.features.is_empty() {
        html.push_str("<li class=\"list-group-item text-muted\">No specific features detected</li>");
    } else {
        for feature in &result.features {
            html.push_str(&format!(
                "<li class=\"list-group-item\"><i class=\"fas fa-check-circle text-success me-2\"></i>{}</li>",
                escape_html(feature)
            ));
        }
    }
    html.push_str("</ul></div></div></div></div>");

    if !result.recommendations.is_empty() {
        html.push_str("<div class=\"card mb-4\">");
        html.push_str("<div class=\"card-header bg-success text-white\"><h5 class=\"mb-0\"><i class=\"fas fa-clipboard-list me-2\"></i>Treatment &amp; Recommendations</h5></div>");
        html.push_str("<div class=\"card-body\"><ul class=\"list-group\">");
        for recommendation in &result.recommendations {
            html.push_str(&format!(
                "<li class=\"list-group-item\"><i class=\"fas {} me-2\"></i>{}</li>",
                recommendation_icon(recommendation),
                escape_html(recommendation)
            ));
        }
        html.push_str("</ul></div></div>");
    }

    html
}

/// Breed result card followed by the characteristics card when there are any
pub fn render_breed_result(result: &BreedPrediction) -> String {
    let mut html = String::new();

    html.push_str("<div class=\"card mb-4\">");
    html.push_str("<div class=\"card-header bg-primary text-white\"><h5 class=\"mb-0\"><i class=\"fas fa-dna me-2\"></i>Breed Identification Result</h5></div>");
    html.push_str("<div class=\"card-body\"><div class=\"row\"><div class=\"col-md-4 text-center\">");
    html.push_str(&result_image(result.image_url.as_deref()));
    html.push_str(&format!(
        "<div class=\"breed-result\"><h4>{}</h4><div class=\"confidence-badge {}\">{} Confidence</div></div>",
        escape_html(&result.breed),
        confidence_badge_class(result.confidence_value),
        escape_html(&result.confidence)
    ));
    html.push_str("</div><div class=\"col-md-8\"><h5>Other Possible Breeds:</h5><div class=\"list-group mb-3\">");
    if result.all_predictions.is_empty() {
        html.push_str("<div class=\"list-group-item text-muted\">No other breeds identified</div>");
    } else {
        for prediction in &result.all_predictions {
            html.push_str(&ranked_item(
                &prediction.breed,
                confidence_badge_class(prediction.confidence),
                &format!("{:.1}%", prediction.confidence),
            ));
        }
    }
    html.push_str("</div></div></div></div></div>");

    if !result.characteristics.is_empty() {
        html.push_str(&render_characteristics(&result.characteristics));
    }

    html
}

fn render_characteristics(characteristics: &Map<String, Value>) -> String {
    let mut html = String::new();
    html.push_str("<div class=\"card mb-4\">");
    html.push_str("<div class=\"card-header bg-success text-white\"><h5 class=\"mb-0\"><i class=\"fas fa-info-circle me-2\"></i>Breed Characteristics</h5></div>");
    html.push_str("<div class=\"card-body\"><div class=\"row\">");

    if let Some(description) = characteristics.get("description") {
        html.push_str(&format!(
            "<div class=\"col-12 mb-3\"><h6>Description</h6><p>{}</p></div>",
            escape_html(&display_value(description))
        ));
    }

    html.push_str("<div class=\"col-12\"><table class=\"table table-bordered\"><tbody>");
    for (key, value) in characteristics.iter().filter(|(key, _)| key.as_str() != "description") {
        html.push_str(&format!(
            "<tr><th scope=\"row\" style=\"width: 30%;\">{}</th><td>{}</td></tr>",
            escape_html(&title_case_key(key)),
            escape_html(&display_value(value))
        ));
    }
    html.push_str("</tbody></table></div>");

    html.push_str("</div></div></div>");
    html
}

/// Warning shown when the image does not contain the selected animal
pub fn render_mismatch_alert(message: &str, image_url: Option<&str>) -> String {
    let mut html = format!(
        "<div class=\"alert alert-warning\"><h4 class=\"alert-heading\"><i class=\"fas fa-exclamation-triangle me-2\"></i>Animal Type Mismatch</h4><p>{}</p><hr><p class=\"mb-0\">Please select the correct animal type or upload a different image.</p></div>",
        escape_html(message)
    );
    if let Some(url) = image_url {
        html.push_str(&format!(
            "<div class=\"text-center mt-3\"><img src=\"{}\" class=\"img-fluid rounded\" style=\"max-height: 300px;\"></div>",
            escape_html(url)
        ));
    }
    html
}

/// Heading, icon and remediation hints chosen for an error message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPresentation {
    pub title: &'static str,
    pub icon: &'static str,
    pub hints: &'static [&'static str],
    pub summary: Option<&'static str>,
}

/// Pick the presentation of an error from the server message. Processing
/// errors take precedence over generic corruption errors.
pub fn classify_error(message: &str) -> ErrorPresentation {
    if message.contains("source code string") || message.contains("null byte") {
        return ErrorPresentation {
            title: "Image Processing Error",
            icon: "exclamation-triangle",
            summary: Some("The system encountered an error processing this image."),
            hints: &[
                "Try uploading a different image",
                "Ensure the image is not corrupted",
                "Images should be in common formats like JPG or PNG",
            ],
        };
    }

    if message.contains("null bytes") || message.contains("corrupted") || message.contains("Unable to read") {
        return ErrorPresentation {
            title: "Image Error Detected",
            icon: "file-image",
            summary: Some("The image appears to be corrupted or invalid. Please try uploading a different image file."),
            hints: &[
                "Ensure the file is a valid image (JPG, PNG, etc.)",
                "Try a different image",
                "Make sure the file isn't corrupted",
            ],
        };
    }

    ErrorPresentation {
        title: "Error",
        icon: "exclamation-circle",
        summary: None,
        hints: &[],
    }
}

/// Danger alert for a failed prediction
pub fn render_error_alert(message: &str) -> String {
    let presentation = classify_error(message);

    let mut html = format!(
        "<div class=\"alert alert-danger\"><h4 class=\"alert-heading\"><i class=\"fas fa-{} me-2\"></i>{}</h4><p>{}</p>",
        presentation.icon,
        presentation.title,
        escape_html(message)
    );
    if let Some(summary) = presentation.summary {
        html.push_str(&format!("<hr><p class=\"mb-0\">{}</p><ul class=\"mt-2 mb-0\">", escape_html(summary)));
        for hint in presentation.hints {
            html.push_str(&format!("<li>{}</li>", escape_html(hint)));
        }
        html.push_str("</ul>");
    }
    html.push_str("</div>");
    html
}
