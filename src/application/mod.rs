//! The internal farm application: questionnaire answers, autosave and the
//! submission workflow

pub mod autosave;
pub mod choice;
pub mod questions;
pub mod record;
pub mod submission;

pub use autosave::{ApplicationSink, AutosaveSession, FieldEdit};
pub use choice::{AnswerSummary, Choice, YesNo};
pub use questions::*;
pub use record::FarmInfoInternalApplication;
pub use submission::{ApplicationProgress, SubmissionFlow, SubmissionState};
