//! Line-oriented assessment runner for the terminal.

use std::time::Duration;

use assess_core::model::{AssessmentId, AssessmentResult};
use services::{AssessmentService, AssessmentServiceError, SessionSnapshot};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Choose(usize),
    Next,
    Previous,
    GoTo(usize),
    Submit,
    Quit,
    Unknown,
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    match line {
        "n" | "next" => return Input::Next,
        "p" | "prev" => return Input::Previous,
        "s" | "submit" => return Input::Submit,
        "q" | "quit" => return Input::Quit,
        _ => {}
    }
    if let Some(rest) = line.strip_prefix("g ") {
        return rest
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .map_or(Input::Unknown, Input::GoTo);
    }
    // Options are shown one-based.
    line.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .map_or(Input::Unknown, Input::Choose)
}

fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn render(snapshot: &SessionSnapshot) {
    let progress = snapshot.progress();
    println!();
    println!(
        "[{}] Question {}/{}  answered {}  unanswered {}  time left {}",
        snapshot.definition.title(),
        progress.current_index + 1,
        progress.total,
        progress.answered,
        progress.unanswered(),
        format_clock(progress.remaining_seconds),
    );
    if progress.is_time_up() {
        println!("Time is up. Submit with s when ready.");
    }
    let Some(question) = snapshot.current_question() else {
        return;
    };
    println!("{}", question.prompt());
    let selected = snapshot.current_answer();
    for (index, option) in question.options().iter().enumerate() {
        let marker = if selected == Some(index) { '*' } else { ' ' };
        println!(" {marker} {}. {option}", index + 1);
    }
    println!("(1-{} answer, n next, p prev, g <k> go to, s submit, q quit)", question.options().len());
}

/// Runs one attempt interactively and returns the recorded result.
///
/// Quitting or closing stdin submits whatever has been answered.
///
/// # Errors
///
/// Returns `AssessmentServiceError` if the attempt cannot be started or recorded.
pub async fn run_session(
    service: &AssessmentService,
    assessment_id: AssessmentId,
) -> Result<Option<AssessmentResult>, AssessmentServiceError> {
    let snapshot = service.start(assessment_id).await?;
    println!("{}", snapshot.definition.description());
    render(&snapshot);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut poll = tokio::time::interval(Duration::from_millis(500));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Ok(Some(line)) = line else {
                    return service.submit().await;
                };
                let manager = service.manager();
                match parse_input(&line) {
                    Input::Choose(option) => {
                        if let Some(index) = manager.current_question_index() {
                            manager.answer_question(index, option);
                        }
                    }
                    Input::Next => manager.next_question(),
                    Input::Previous => manager.previous_question(),
                    Input::GoTo(index) => manager.go_to_question(index),
                    Input::Submit | Input::Quit => return service.submit().await,
                    Input::Unknown => println!("unrecognised input: {}", line.trim()),
                }
                match manager.snapshot() {
                    Some(snapshot) => render(&snapshot),
                    None => return service.collect_expired().await,
                }
            }
            _ = poll.tick() => {
                if let Some(result) = service.collect_expired().await? {
                    println!();
                    println!("Time is up.");
                    return Ok(Some(result));
                }
            }
        }
    }
}

pub fn print_result(result: &AssessmentResult) {
    println!();
    println!("{}", result.definition().title());
    println!(
        "Score: {}% ({}/{} correct, pass mark {}%)",
        result.score(),
        result.correct_count(),
        result.total_questions(),
        result.definition().passing_score(),
    );
    println!("Status: {}", result.status().as_str());
    println!(
        "Attempts: {}/{}",
        result.attempts(),
        result.definition().max_attempts()
    );
    println!("Time taken: {}", format_clock(u32::try_from(result.elapsed_secs()).unwrap_or(u32::MAX)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_one_based_choices() {
        assert_eq!(parse_input("1"), Input::Choose(0));
        assert_eq!(parse_input(" 4 "), Input::Choose(3));
        assert_eq!(parse_input("0"), Input::Unknown);
    }

    #[test]
    fn parses_navigation() {
        assert_eq!(parse_input("n"), Input::Next);
        assert_eq!(parse_input("prev"), Input::Previous);
        assert_eq!(parse_input("g 3"), Input::GoTo(2));
        assert_eq!(parse_input("g x"), Input::Unknown);
        assert_eq!(parse_input("s"), Input::Submit);
    }

    #[test]
    fn formats_clock() {
        assert_eq!(format_clock(600), "10:00");
        assert_eq!(format_clock(59), "00:59");
    }
}
