//! Terminal rendering of quiz views.

use comfy_table::{Cell, Color, Table};

use quizzy_core::report::{AttemptReport, MarkerColor, PublishSummary, ResultStyle};
use quizzy_core::traits::{PageView, QuizView, Renderer};

/// Draws views as plain text on stdout.
pub struct TerminalRenderer;

impl Renderer for TerminalRenderer {
    fn render(&self, view: &QuizView) {
        match view {
            QuizView::Idle => println!("Quiz reset."),
            QuizView::Page(page) => print!("{}", page_text(page)),
            QuizView::Results(results) => {
                print!("{}", report_text(&results.report));
                if let Some(summary) = results.published {
                    print!("{}", publish_text(&summary));
                }
                println!("\nType 'r' to try again or 'q' to quit.");
            }
        }
    }
}

pub fn page_text(page: &PageView) -> String {
    let mut out = format!("\n== {} ==  {}\n", page.topic, page.progress_text());
    let numbered = page.questions.len() > 1;

    for question in &page.questions {
        if numbered {
            out.push_str(&format!("\n{}. {}\n", question.index + 1, question.text));
        } else {
            out.push_str(&format!("\n{}\n", question.text));
        }
        for (i, option) in question.options.iter().enumerate() {
            let marker = if option.selected { "*" } else { " " };
            out.push_str(&format!("  {marker} {}) {}\n", i + 1, option.label));
        }
    }

    let mut commands = Vec::new();
    if numbered {
        commands.push("<question> <option> to answer");
    } else {
        commands.push("1-4 to answer");
        if !page.is_first {
            commands.push("[p]rev");
        }
        if !page.is_last {
            commands.push("[n]ext");
        }
    }
    commands.push("[s]ubmit");
    commands.push("[q]uit");
    out.push_str(&format!("\n{}\n", commands.join("  ")));
    out
}

fn cell_color(color: MarkerColor) -> Color {
    match color {
        MarkerColor::Green => Color::Green,
        MarkerColor::Red => Color::Red,
    }
}

pub fn feedback_table(report: &AttemptReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "#",
        "Question",
        "Your Answer",
        "Correct Answer",
        "Result",
    ]);

    for (i, entry) in report.feedback.iter().enumerate() {
        let style = ResultStyle::of(entry.result);
        let mut result = format!("{} {}", style.symbol, style.label);
        if entry.unscorable {
            result.push_str(" (unscorable)");
        }
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&entry.question_text),
            Cell::new(entry.user_answer.to_string()),
            Cell::new(&entry.correct_answer),
            Cell::new(result).fg(cell_color(style.color)),
        ]);
    }

    table
}

pub fn report_text(report: &AttemptReport) -> String {
    let mut out = String::from("\n");
    if let Some(name) = &report.identifier {
        out.push_str(&format!("Results for {name}\n"));
    }
    out.push_str(&format!("{}\n", report.score_line()));
    out.push_str(&format!("{}\n\n", report.duration_line()));
    out.push_str(&format!("{}\n", feedback_table(report)));
    out
}

pub fn publish_text(summary: &PublishSummary) -> String {
    if summary.is_complete() {
        format!("Recorded {} responses and score.\n", summary.responses_written)
    } else {
        format!(
            "Warning: results were only partly recorded ({} of {} responses, score {}).\n",
            summary.responses_written,
            summary.responses_written + summary.responses_failed,
            if summary.score_written { "saved" } else { "not saved" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizzy_core::model::{AnswerResult, FeedbackEntry, UserAnswer};
    use quizzy_core::traits::{OptionView, QuestionView};

    fn question(index: usize, selected: Option<usize>) -> QuestionView {
        QuestionView {
            index,
            text: format!("Question {}", index + 1),
            options: ["a", "b", "c", "d"]
                .iter()
                .enumerate()
                .map(|(i, label)| OptionView {
                    label: label.to_string(),
                    selected: selected == Some(i),
                })
                .collect(),
        }
    }

    #[test]
    fn sequential_page_gates_navigation() {
        let page = PageView {
            topic: "math".into(),
            position: 1,
            total: 2,
            answered: 1,
            is_first: true,
            is_last: false,
            questions: vec![question(0, Some(1))],
        };
        let text = page_text(&page);
        assert!(text.contains("Question 1 of 2"));
        assert!(text.contains("* 2) b"));
        assert!(text.contains("[n]ext"));
        assert!(!text.contains("[p]rev"));
    }

    #[test]
    fn single_page_numbers_questions() {
        let page = PageView {
            topic: "math".into(),
            position: 1,
            total: 2,
            answered: 0,
            is_first: true,
            is_last: true,
            questions: vec![question(0, None), question(1, None)],
        };
        let text = page_text(&page);
        assert!(text.contains("2. Question 2"));
        assert!(text.contains("<question> <option>"));
        assert!(!text.contains("[n]ext"));
    }

    #[test]
    fn results_include_score_and_markers() {
        let report = AttemptReport {
            id: Default::default(),
            created_at: chrono::Utc::now(),
            topic: "math".into(),
            identifier: None,
            score: 0,
            total: 1,
            duration_ms: 3_000,
            feedback: vec![FeedbackEntry {
                question_text: "2+2?".into(),
                user_answer: UserAnswer::Given("5".into()),
                correct_answer: "4".into(),
                result: AnswerResult::Incorrect,
                unscorable: false,
            }],
        };
        let text = report_text(&report);
        assert!(text.contains("Your final score is: 0 / 1"));
        assert!(text.contains("Time taken: 0m 3s"));
        assert!(text.contains("Incorrect"));
    }

    #[test]
    fn partial_publish_is_reported() {
        let summary = PublishSummary {
            responses_written: 1,
            responses_failed: 1,
            score_written: true,
        };
        assert!(publish_text(&summary).contains("1 of 2 responses"));
    }
}
