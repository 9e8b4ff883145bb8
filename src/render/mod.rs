/*!
 * HTML rendering for collaborator responses.
 *
 * - `html`: escaping and small formatting helpers
 * - `prediction`: breed and disease prediction cards and alerts
 * - `alerts`: disease-info and outbreak modal bodies
 */

pub mod alerts;
pub mod html;
pub mod prediction;

pub use self::alerts::{DiseaseInfo, OutbreakDetails, OutbreakStatistics};
pub use self::html::escape_html;
pub use self::prediction::{
    BreedPrediction, DiseasePrediction, PredictionEnvelope, RankedBreed, RankedDisease,
    confidence_badge_class,
};
