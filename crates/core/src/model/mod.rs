mod answer;
mod assessment;
mod ids;
mod question;
mod result;

pub use ids::{AssessmentId, ParseIdError, QuestionId};

pub use answer::AnswerSheet;
pub use assessment::{AssessmentDefinition, AssessmentError, AssessmentStatus};
pub use question::{Difficulty, Provenance, Question, QuestionError};
pub use result::AssessmentResult;
