//! Interaction model for one session.
//!
//! Each user action is an [`Event`]. [`App::handle`] turns the current
//! [`AppState`] plus an event into the next state, and [`render`] draws a state.
//! Nothing is redrawn as a side effect of appending.

use std::collections::BTreeSet;
use std::fmt::Write;

use log::{error, info};

use crate::assistant::{Assistant, ChatSession, Transcript};
use crate::predictor::{DataLoadError, PredictError, Predictor, RankedPrediction, SelectionError};

pub const HOME_TEXT: &str = "This app predicts diseases based on symptoms and allows chat with a health-focused AI.";
pub const ABOUT_TEXT: &str = "Combines a trained disease prediction model with a Gemini AI chatbot for health Q&A.";

/// A single user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    AddSymptoms(Vec<String>),
    RemoveSymptoms(Vec<String>),
    ClearSymptoms,
    Ask(String),
}

/// What the prediction section currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionView {
    /// Prediction inputs failed to load; the section is disabled.
    Unavailable(String),
    /// Below the minimum selection size.
    NeedMoreSymptoms { selected: usize, required: usize },
    Ranked(Vec<RankedPrediction>),
    Failed(String),
}

/// Everything that is rendered for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub selected: BTreeSet<String>,
    pub prediction: PredictionView,
    pub transcript: Transcript,
}

/// The two features of a session. Prediction may be unavailable on its own.
pub struct App<A> {
    predictor: Result<Predictor, String>,
    chat: ChatSession<A>,
}

impl<A: Assistant> App<A> {
    /// A load failure disables prediction only; chat keeps working.
    pub fn new(predictor: Result<Predictor, DataLoadError>, chat: ChatSession<A>) -> Self {
        let predictor = predictor.map_err(|e| {
            error!("Prediction disabled: {}", e);
            e.to_string()
        });
        Self { predictor, chat }
    }

    pub fn predictor(&self) -> Option<&Predictor> {
        self.predictor.as_ref().ok()
    }

    pub fn chat(&self) -> &ChatSession<A> {
        &self.chat
    }

    pub fn initial_state(&self) -> AppState {
        let selected = BTreeSet::new();
        AppState {
            prediction: self.prediction_for(&selected),
            selected,
            transcript: Transcript::new(),
        }
    }

    /// Applies one event and returns the resulting state.
    pub async fn handle(&self, state: AppState, event: Event) -> AppState {
        let AppState { mut selected, prediction, transcript } = state;
        match event {
            Event::AddSymptoms(symptoms) => {
                selected.extend(symptoms.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()));
            }
            Event::RemoveSymptoms(symptoms) => {
                for symptom in symptoms {
                    selected.remove(symptom.trim());
                }
            }
            Event::ClearSymptoms => selected.clear(),
            Event::Ask(utterance) => {
                let transcript = self.chat.submit(transcript, &utterance).await;
                return AppState { selected, prediction, transcript };
            }
        }
        AppState {
            prediction: self.prediction_for(&selected),
            selected,
            transcript,
        }
    }

    fn prediction_for(&self, selected: &BTreeSet<String>) -> PredictionView {
        let predictor = match &self.predictor {
            Ok(predictor) => predictor,
            Err(reason) => return PredictionView::Unavailable(reason.clone()),
        };
        let selected: Vec<&str> = selected.iter().map(String::as_str).collect();
        match predictor.predict(&selected) {
            Ok(results) => {
                info!("Ranked {} candidates for {} symptoms", results.len(), selected.len());
                PredictionView::Ranked(results)
            }
            Err(PredictError::Selection(SelectionError::TooFewSymptoms { selected, required })) => {
                PredictionView::NeedMoreSymptoms { selected, required }
            }
            Err(e) => {
                error!("Prediction failed: {}", e);
                PredictionView::Failed(e.to_string())
            }
        }
    }
}

/// Renders the prediction section.
pub fn render_prediction(state: &AppState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Predict Disease ==");
    if !state.selected.is_empty() {
        let selected: Vec<&str> = state.selected.iter().map(String::as_str).collect();
        let _ = writeln!(out, "Selected: {}", selected.join(", "));
    }
    match &state.prediction {
        PredictionView::Unavailable(reason) => {
            let _ = writeln!(out, "Error loading files: {}", reason);
        }
        PredictionView::NeedMoreSymptoms { required, .. } => {
            let _ = writeln!(out, "Select at least {} symptoms.", required);
        }
        PredictionView::Failed(reason) => {
            let _ = writeln!(out, "Prediction failed: {}", reason);
        }
        PredictionView::Ranked(results) => {
            for result in results {
                let _ = writeln!(out);
                let _ = writeln!(out, "{}", result.caption());
                if let Some(image) = &result.image {
                    let _ = writeln!(out, "  [image: {}]", image.display());
                }
                let _ = writeln!(out, "  {}", result.about);
            }
        }
    }
    out
}

/// Renders the chat transcript.
pub fn render_transcript(transcript: &Transcript) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Ask the Health AI Assistant ==");
    for message in transcript.messages() {
        let speaker = if message.is_user { "You" } else { "Assistant" };
        let _ = writeln!(out, "{}: {}", speaker, message.text);
    }
    out
}

/// Renders the whole session. Pure function of the state.
pub fn render(state: &AppState) -> String {
    format!("{}\n{}", render_prediction(state), render_transcript(&state.transcript))
}

/// Renders the welcome blurbs shown once at startup.
pub fn render_home() -> String {
    format!("== Home ==\nWelcome!\n{}\n\n== About ==\n{}\n", HOME_TEXT, ABOUT_TEXT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::{AssistantError, Message};
    use std::path::PathBuf;

    struct Canned;

    impl Assistant for Canned {
        async fn generate(&self, _prompt: &str) -> Result<String, AssistantError> {
            Ok("Drink fluids.".to_string())
        }
    }

    #[test]
    fn test_render_ranked() {
        let state = AppState {
            selected: ["cough", "fatigue", "fever"].iter().map(|s| s.to_string()).collect(),
            prediction: PredictionView::Ranked(vec![RankedPrediction {
                disease: "Flu".into(),
                probability: 0.6,
                about: "Seasonal influenza.".into(),
                image: Some(PathBuf::from("static/Flu.jpg")),
            }]),
            transcript: Transcript::new()
                .with_message(Message::user("hi"))
                .with_message(Message::assistant("hello")),
        };
        let text = render(&state);
        assert!(text.contains("Selected: cough, fatigue, fever"));
        assert!(text.contains("Flu (60.00%)"));
        assert!(text.contains("[image: static/Flu.jpg]"));
        assert!(text.contains("Seasonal influenza."));
        assert!(text.contains("You: hi\nAssistant: hello\n"));
        // Same state, same output
        assert_eq!(text, render(&state));
    }

    #[tokio::test]
    async fn test_unavailable_prediction_keeps_chat() {
        let app = App::new(
            Err(DataLoadError::Missing(PathBuf::from("/data/model.onnx"))),
            ChatSession::new(Some(Canned)),
        );
        let state = app.initial_state();
        assert!(matches!(state.prediction, PredictionView::Unavailable(_)));

        let state = app.handle(state, Event::AddSymptoms(vec!["fever".into()])).await;
        assert!(matches!(state.prediction, PredictionView::Unavailable(_)));
        assert!(render_prediction(&state).contains("Error loading files"));

        let state = app.handle(state, Event::Ask("What is flu?".into())).await;
        assert_eq!(state.transcript.len(), 2);
        assert_eq!(state.transcript.last().unwrap().text, "Drink fluids.");
    }
}
