//! Built-in question pool and assessment catalog.

use assess_core::model::{
    AssessmentDefinition, AssessmentError, AssessmentId, Difficulty, Provenance, Question,
    QuestionError, QuestionId,
};

struct PoolEntry {
    prompt: &'static str,
    options: [&'static str; 4],
    correct: usize,
    explanation: &'static str,
    difficulty: Difficulty,
    provenance: Provenance,
}

const POOL: &[PoolEntry] = &[
    PoolEntry {
        prompt: "What is the first step when onboarding a new trainee to a gig?",
        options: [
            "Assign advanced tasks immediately",
            "Review the gig's requirements and expectations",
            "Skip the introduction session",
            "Hand over the customer list",
        ],
        correct: 1,
        explanation: "Trainees need to understand the gig before any task is assigned.",
        difficulty: Difficulty::Easy,
        provenance: Provenance::Curated,
    },
    PoolEntry {
        prompt: "Which channel should be used to escalate an unresolved customer complaint?",
        options: [
            "Public social media",
            "A personal email account",
            "The documented escalation path to a supervisor",
            "Ignore it until the next shift",
        ],
        correct: 2,
        explanation: "Escalations follow the documented path so they are tracked.",
        difficulty: Difficulty::Easy,
        provenance: Provenance::Curated,
    },
    PoolEntry {
        prompt: "A caller asks for another customer's account details. What do you do?",
        options: [
            "Share them if the caller sounds confident",
            "Refuse and explain the data protection policy",
            "Read out only the address",
            "Transfer the call without comment",
        ],
        correct: 1,
        explanation: "Account data is only disclosed to the verified account holder.",
        difficulty: Difficulty::Medium,
        provenance: Provenance::Curated,
    },
    PoolEntry {
        prompt: "What does a first-contact resolution rate measure?",
        options: [
            "Calls answered within 20 seconds",
            "Issues resolved without a follow-up contact",
            "Average handling time",
            "Customer satisfaction surveys sent",
        ],
        correct: 1,
        explanation: "FCR counts issues closed on the first interaction.",
        difficulty: Difficulty::Medium,
        provenance: Provenance::AiGenerated,
    },
    PoolEntry {
        prompt: "Which behaviour best demonstrates active listening?",
        options: [
            "Interrupting to save time",
            "Paraphrasing the customer's concern before answering",
            "Reading the script word for word",
            "Muting the line while searching",
        ],
        correct: 1,
        explanation: "Paraphrasing confirms understanding of the concern.",
        difficulty: Difficulty::Easy,
        provenance: Provenance::AiGenerated,
    },
    PoolEntry {
        prompt: "When is it acceptable to skip identity verification?",
        options: [
            "When the queue is long",
            "When the caller is a repeat customer",
            "Never for account-specific requests",
            "When a supervisor is busy",
        ],
        correct: 2,
        explanation: "Verification is mandatory for any account-specific request.",
        difficulty: Difficulty::Hard,
        provenance: Provenance::Curated,
    },
    PoolEntry {
        prompt: "What is the purpose of a post-call wrap-up note?",
        options: [
            "To record the outcome for the next agent",
            "To lengthen average handling time",
            "To replace the ticketing system",
            "It has no purpose",
        ],
        correct: 0,
        explanation: "Wrap-up notes keep context available for follow-ups.",
        difficulty: Difficulty::Medium,
        provenance: Provenance::Curated,
    },
    PoolEntry {
        prompt: "A trainee repeatedly misses quality targets. What is the best first response?",
        options: [
            "Remove them from the gig",
            "Review recorded sessions together and agree on a coaching plan",
            "Lower the quality targets",
            "Wait for the next quarterly review",
        ],
        correct: 1,
        explanation: "Targeted coaching based on real sessions addresses the gap directly.",
        difficulty: Difficulty::Hard,
        provenance: Provenance::AiGenerated,
    },
    PoolEntry {
        prompt: "Which of these is a compliant way to store customer payment data?",
        options: [
            "On a sticky note at the desk",
            "In a shared spreadsheet",
            "Only in the approved payment system",
            "In chat messages to colleagues",
        ],
        correct: 2,
        explanation: "Payment data stays inside the approved, audited system.",
        difficulty: Difficulty::Medium,
        provenance: Provenance::Curated,
    },
    PoolEntry {
        prompt: "What should you do before ending a support call?",
        options: [
            "Confirm the customer has no further questions",
            "Hang up as soon as the fix is applied",
            "Ask for a five-star rating",
            "Transfer to billing",
        ],
        correct: 0,
        explanation: "Confirming closure avoids repeat contacts.",
        difficulty: Difficulty::Easy,
        provenance: Provenance::Curated,
    },
];

/// The fixed question pool in canonical order.
///
/// # Errors
///
/// Returns `QuestionError` if a pool entry fails validation.
pub fn canonical_pool() -> Result<Vec<Question>, QuestionError> {
    POOL.iter()
        .zip(1_u64..)
        .map(|(entry, id)| {
            let options = entry.options.iter().map(|o| (*o).to_owned()).collect();
            Question::new(
                QuestionId::new(id),
                entry.prompt,
                options,
                entry.correct,
                entry.explanation,
            )
            .map(|q| {
                q.with_difficulty(entry.difficulty)
                    .with_provenance(entry.provenance)
            })
        })
        .collect()
}

/// Assessments offered out of the box.
///
/// # Errors
///
/// Returns `AssessmentError` if a catalog entry fails validation.
pub fn sample_catalog() -> Result<Vec<AssessmentDefinition>, AssessmentError> {
    Ok(vec![
        AssessmentDefinition::new(
            AssessmentId::new(1),
            "Customer Support Fundamentals",
            "Core conduct and escalation rules for new support agents.",
            5,
            70,
            10,
            3,
        )?,
        AssessmentDefinition::new(
            AssessmentId::new(2),
            "Data Protection Essentials",
            "Identity verification and handling of customer data.",
            8,
            80,
            15,
            2,
        )?
        .with_adaptive(true),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_is_valid_and_ordered() {
        let pool = canonical_pool().unwrap();
        assert_eq!(pool.len(), POOL.len());
        let ids: Vec<u64> = pool.iter().map(|q| q.id().value()).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn catalog_fits_in_pool() {
        let pool_len = canonical_pool().unwrap().len();
        for def in sample_catalog().unwrap() {
            assert!(def.question_count() as usize <= pool_len);
        }
    }
}
