/*!
 * Breed and disease prediction submission.
 *
 * Uploads an image with the selected animal type and classifies the JSON
 * answer. The server reports validation problems (wrong animal, corrupt image)
 * as JSON with an `error` field and a 4xx status, so the body is interpreted
 * whatever the status.
 */

use log::{debug, error, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::render::prediction::{
    BreedPrediction, DiseasePrediction, PredictionEnvelope, UNEXPECTED_ERROR_MESSAGE,
    render_breed_result, render_disease_result, render_error_alert, render_mismatch_alert,
};
use crate::transport::{FormPart, HttpRequest, HttpResponse, Transport};

const SPINNER: &str = "<span class=\"spinner-border spinner-border-sm\" role=\"status\" aria-hidden=\"true\"></span>";

/// Label shown on the submit button while a request runs
pub const BUSY_LABEL: &str = "<span class=\"spinner-border spinner-border-sm\" role=\"status\" aria-hidden=\"true\"></span> Processing...";

/// Which predictor to call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionKind {
    Breed,
    Disease,
}

impl PredictionKind {
    /// Endpoint receiving the upload
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Breed => "/breed/predict",
            Self::Disease => "/disease/predict",
        }
    }
}

/// Contents of the upload form
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionForm {
    pub animal_type: String,
    pub file_name: String,
    pub image: Vec<u8>,
    /// Additional text fields
    pub fields: Vec<(String, String)>,
}

impl PredictionForm {
    /// Form for one image of the given animal type
    pub fn new(animal_type: &str, file_name: &str, image: Vec<u8>) -> Self {
        Self {
            animal_type: animal_type.to_string(),
            file_name: file_name.to_string(),
            image,
            fields: Vec::new(),
        }
    }

    /// Add a text field
    pub fn field(mut self, name: &str, value: &str) -> Self {
        self.fields.push((name.to_string(), value.to_string()));
        self
    }

    fn into_parts(self) -> Vec<FormPart> {
        let mime = guess_image_mime(&self.file_name).to_string();
        let mut parts = vec![FormPart::Text {
            name: "animalType".to_string(),
            value: self.animal_type,
        }];
        parts.extend(
            self.fields
                .into_iter()
                .map(|(name, value)| FormPart::Text { name, value }),
        );
        parts.push(FormPart::File {
            name: "image".to_string(),
            file_name: self.file_name,
            mime,
            bytes: self.image,
        });
        parts
    }
}

/// MIME type for an image file name
pub fn guess_image_mime(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Interpreted prediction response
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    Breed(BreedPrediction),
    Disease(DiseasePrediction),
    /// The image shows a different animal than selected
    Mismatch { message: String, image_url: Option<String> },
    /// Server error message, or a generic one when the request itself failed
    Failed(String),
}

/// Where a rendered outcome goes on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeTarget {
    ResultContainer,
    ErrorContainer,
}

impl PredictionOutcome {
    /// Interpret a prediction response
    pub fn from_response(kind: PredictionKind, response: &HttpResponse) -> Self {
        let Ok(value) = serde_json::from_str::<Value>(&response.body) else {
            warn!("Prediction response with status {} is not JSON", response.status);
            return Self::Failed(UNEXPECTED_ERROR_MESSAGE.to_string());
        };

        let envelope: PredictionEnvelope = serde_json::from_value(value.clone()).unwrap_or_default();
        if envelope.animal_mismatch {
            return Self::Mismatch {
                message: envelope.error.unwrap_or_default(),
                image_url: envelope.image_url,
            };
        }
        if let Some(message) = envelope.error {
            return Self::Failed(message);
        }

        let decoded = match kind {
            PredictionKind::Breed => decode(value).map(Self::Breed),
            PredictionKind::Disease => decode(value).map(Self::Disease),
        };
        decoded.unwrap_or_else(|| Self::Failed(UNEXPECTED_ERROR_MESSAGE.to_string()))
    }

    /// HTML for this outcome and the container it belongs in
    pub fn render(&self) -> (OutcomeTarget, String) {
        match self {
            Self::Breed(result) => (OutcomeTarget::ResultContainer, render_breed_result(result)),
            Self::Disease(result) => (OutcomeTarget::ResultContainer, render_disease_result(result)),
            Self::Mismatch { message, image_url } => (
                OutcomeTarget::ErrorContainer,
                render_mismatch_alert(message, image_url.as_deref()),
            ),
            Self::Failed(message) => (OutcomeTarget::ErrorContainer, render_error_alert(message)),
        }
    }
}

fn decode<R: DeserializeOwned>(value: Value) -> Option<R> {
    serde_json::from_value(value)
        .map_err(|e| error!("Malformed prediction payload: {}", e))
        .ok()
}

/// Submit button state around a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormControl {
    original_label: String,
    label: String,
    disabled: bool,
}

impl FormControl {
    /// Idle control with the given label
    pub fn new(label: &str) -> Self {
        Self {
            original_label: label.to_string(),
            label: label.to_string(),
            disabled: false,
        }
    }

    /// Disable the control and show the spinner label
    pub fn begin(&mut self) {
        self.label = BUSY_LABEL.to_string();
        self.disabled = true;
    }

    /// Disable the control and show the spinner followed by `text`
    pub fn begin_with(&mut self, text: &str) {
        self.label = format!("{} {}", SPINNER, text);
        self.disabled = true;
    }

    /// Restore the original label and enable the control
    pub fn restore(&mut self) {
        self.label = self.original_label.clone();
        self.disabled = false;
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

/// Client for the prediction endpoints
#[derive(Debug, Clone)]
pub struct PredictionClient<T> {
    transport: T,
}

impl<T: Transport> PredictionClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Upload the form and interpret the answer. The control is busy for the
    /// duration of the request and restored on every path.
    pub async fn submit(&self, kind: PredictionKind, form: PredictionForm, control: &mut FormControl) -> PredictionOutcome {
        control.begin();
        debug!("Submitting {} byte image to {}", form.image.len(), kind.endpoint());

        let result = self
            .transport
            .send(HttpRequest::post_multipart(kind.endpoint(), form.into_parts()))
            .await;
        control.restore();

        match result {
            Ok(response) => PredictionOutcome::from_response(kind, &response),
            Err(e) => {
                error!("Prediction request failed: {}", e);
                PredictionOutcome::Failed(UNEXPECTED_ERROR_MESSAGE.to_string())
            }
        }
    }
}
