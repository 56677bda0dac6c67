use std::collections::HashMap;
use std::sync::Arc;

use symptom_triage::app::{render_home, render_prediction, render_transcript};
use symptom_triage::shell::{parse_command, Command};
use symptom_triage::{
    App, Assistant, AssistantError, ChatSession, ClassifierModel, DiseaseInfo, Event, FeatureVector,
    PredictionError, PredictionView, Predictor, SymptomSchema,
};

/// Scores each class by how many of its symptoms are selected.
struct OverlapModel {
    classes: Vec<String>,
    signatures: Vec<Vec<usize>>,
}

impl ClassifierModel for OverlapModel {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f32>, PredictionError> {
        let active = features.active_positions();
        let scores: Vec<f32> = self
            .signatures
            .iter()
            .map(|sig| 1.0 + sig.iter().filter(|i| active.contains(i)).count() as f32)
            .collect();
        let total: f32 = scores.iter().sum();
        Ok(scores.into_iter().map(|s| s / total).collect())
    }
}

struct FlakyAssistant;

impl Assistant for FlakyAssistant {
    async fn generate(&self, prompt: &str) -> Result<String, AssistantError> {
        if prompt.contains("fail") {
            Err(AssistantError::Status { status: 503, body: "unavailable".into() })
        } else {
            Ok("Please consult a doctor.".to_string())
        }
    }
}

fn setup_app() -> App<FlakyAssistant> {
    let schema = SymptomSchema::new(vec!["fever", "cough", "fatigue", "rash", "itching"]).unwrap();
    let model = OverlapModel {
        classes: vec!["Flu".into(), "Allergy".into(), "Chicken pox".into()],
        signatures: vec![vec![0, 1, 2], vec![3, 4], vec![0, 2, 3, 4]],
    };
    let info = DiseaseInfo::new(HashMap::from([("Flu".to_string(), "Influenza.".to_string())]));
    let predictor = Predictor::builder()
        .with_schema(schema)
        .with_model(Arc::new(model))
        .with_disease_info(info)
        .build();
    App::new(predictor, ChatSession::new(Some(FlakyAssistant)))
}

async fn apply(app: &App<FlakyAssistant>, state: symptom_triage::AppState, line: &str) -> symptom_triage::AppState {
    match parse_command(line) {
        Command::Event(event) => app.handle(state, event).await,
        other => panic!("'{}' is not an event: {:?}", line, other),
    }
}

#[tokio::test]
async fn test_selection_flow() {
    let app = setup_app();
    let state = app.initial_state();
    assert_eq!(state.prediction, PredictionView::NeedMoreSymptoms { selected: 0, required: 3 });

    let state = apply(&app, state, "select fever, cough").await;
    assert!(render_prediction(&state).contains("Select at least 3 symptoms."));

    let state = apply(&app, state, "add fatigue").await;
    match &state.prediction {
        PredictionView::Ranked(results) => {
            assert_eq!(results.len(), 3);
            assert_eq!(results[0].disease, "Flu");
            assert_eq!(results[0].about, "Influenza.");
            assert!(results.windows(2).all(|w| w[0].probability >= w[1].probability));
        }
        other => panic!("expected ranked results, got {:?}", other),
    }

    let state = apply(&app, state, "remove cough").await;
    assert!(matches!(state.prediction, PredictionView::NeedMoreSymptoms { selected: 2, .. }));

    let state = apply(&app, state, "clear").await;
    assert!(state.selected.is_empty());
}

#[tokio::test]
async fn test_unknown_symptom_shown_as_failure() {
    let app = setup_app();
    let state = apply(&app, app.initial_state(), "select fever, cough, sneezing").await;
    match &state.prediction {
        PredictionView::Failed(reason) => assert!(reason.contains("sneezing")),
        other => panic!("expected failure, got {:?}", other),
    }

    // Removing the bad name recovers
    let state = apply(&app, state, "remove sneezing").await;
    let state = apply(&app, state, "add rash").await;
    assert!(matches!(state.prediction, PredictionView::Ranked(_)));
}

#[tokio::test]
async fn test_chat_errors_are_inline() {
    let app = setup_app();
    let state = apply(&app, app.initial_state(), "ask is flu serious?").await;
    let state = apply(&app, state, "? please fail").await;
    let state = apply(&app, state, "ask still there?").await;

    let rendered = render_transcript(&state.transcript);
    assert_eq!(state.transcript.len(), 6);
    assert!(rendered.contains("You: is flu serious?"));
    assert!(rendered.contains("Assistant: Error: assistant service returned 503: unavailable"));
    assert!(rendered.ends_with("Assistant: Please consult a doctor.\n"));
}

#[tokio::test]
async fn test_chat_does_not_touch_prediction() {
    let app = setup_app();
    let state = apply(&app, app.initial_state(), "select fever, cough, fatigue").await;
    let before = state.prediction.clone();
    let state = apply(&app, state, "ask what now?").await;
    assert_eq!(state.prediction, before);
}

#[test]
fn test_home_blurb() {
    let home = render_home();
    assert!(home.contains("Welcome!"));
    assert!(home.contains("predicts diseases based on symptoms"));
}
