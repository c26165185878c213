//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use quizzy_core::report::{format_duration, AttemptReport, ResultStyle};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML report from an attempt report.
pub fn generate_html(report: &AttemptReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>quizzy results: {}</title>\n",
        html_escape(&report.topic)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!(
        "<h1>Quiz results: {}</h1>\n",
        html_escape(&report.topic)
    ));
    let who = report
        .identifier
        .as_deref()
        .map(|name| format!("{} | ", html_escape(name)))
        .unwrap_or_default();
    html.push_str(&format!(
        "<p class=\"meta\">{}{} questions | {}</p>\n",
        who,
        report.total,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Summary
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str(&format!(
        "<p class=\"score\">{}</p>\n",
        html_escape(&report.score_line())
    ));
    html.push_str(&format!(
        "<p>Time taken: {}</p>\n",
        format_duration(report.duration())
    ));
    html.push_str(&score_bar(report.score, report.total));
    html.push_str("</section>\n");

    // Feedback
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Detailed Feedback</h2>\n");
    html.push_str("<label><input type=\"checkbox\" onchange=\"toggleCorrect(this.checked)\"> Only show incorrect answers</label>\n");
    html.push_str("<table class=\"results-table\" id=\"feedback\">\n");
    html.push_str("<thead><tr><th>#</th><th>Question</th><th>Your Answer</th><th>Correct Answer</th><th>Result</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for (i, entry) in report.feedback.iter().enumerate() {
        let style = ResultStyle::of(entry.result);
        let note = if entry.unscorable {
            " <span class=\"note\" title=\"correct answer was not among the options\">(unscorable)</span>"
        } else {
            ""
        };
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{} {}{}</td></tr>\n",
            style.css_class,
            i + 1,
            html_escape(&entry.question_text),
            html_escape(&entry.user_answer.to_string()),
            html_escape(&entry.correct_answer),
            style.symbol,
            style.label,
            note
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &AttemptReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

fn score_bar(score: usize, total: usize) -> String {
    let bar_height = 24;
    let max_width = 400;

    let ratio = if total == 0 {
        0.0
    } else {
        score as f64 / total as f64
    };
    let width = (ratio * max_width as f64) as usize;

    let color = if ratio >= 0.8 {
        "#22c55e"
    } else if ratio >= 0.5 {
        "#eab308"
    } else {
        "#ef4444"
    };

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        max_width + 60,
        bar_height
    );
    svg.push_str(&format!(
        "  <rect x=\"0\" y=\"0\" width=\"{max_width}\" height=\"{bar_height}\" fill=\"var(--border)\" rx=\"4\"/>\n"
    ));
    svg.push_str(&format!(
        "  <rect x=\"0\" y=\"0\" width=\"{width}\" height=\"{bar_height}\" fill=\"{color}\" rx=\"4\"/>\n"
    ));
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.0}%</text>\n",
        max_width + 8,
        bar_height / 2,
        ratio * 100.0
    ));
    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --correct: #dcfce7; --incorrect: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --correct: #064e3b; --incorrect: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta, .note { color: #6b7280; }
.score { font-size: 1.5rem; font-weight: bold; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.correct { background: var(--correct); }
.incorrect { background: var(--incorrect); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function toggleCorrect(hide) {
  document.querySelectorAll('#feedback tbody tr.correct').forEach(r => {
    r.style.display = hide ? 'none' : '';
  });
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use quizzy_core::model::{AnswerResult, FeedbackEntry, UserAnswer};

    fn make_test_report() -> AttemptReport {
        AttemptReport {
            id: uuid::Uuid::nil(),
            created_at: chrono::Utc::now(),
            topic: "Rust <basics>".into(),
            identifier: Some("ana".into()),
            score: 1,
            total: 2,
            duration_ms: 65_000,
            feedback: vec![
                FeedbackEntry {
                    question_text: "Which keyword declares a constant?".into(),
                    user_answer: UserAnswer::Given("const".into()),
                    correct_answer: "const".into(),
                    result: AnswerResult::Correct,
                    unscorable: false,
                },
                FeedbackEntry {
                    question_text: "Is `&mut` shared?".into(),
                    user_answer: UserAnswer::Unanswered,
                    correct_answer: "No".into(),
                    result: AnswerResult::Incorrect,
                    unscorable: false,
                },
            ],
        }
    }

    #[test]
    fn html_report_contains_required_elements() {
        let html = generate_html(&make_test_report());

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("Your final score is: 1 / 2"));
        assert!(html.contains("Time taken: 1m 5s"));
        assert!(html.contains("Rust &lt;basics&gt;"));
        assert!(html.contains("(unanswered)"));
    }

    #[test]
    fn rows_carry_result_class() {
        let html = generate_html(&make_test_report());
        assert!(html.contains("<tr class=\"correct\"><td>1</td>"));
        assert!(html.contains("<tr class=\"incorrect\"><td>2</td>"));
    }

    #[test]
    fn unscorable_rows_are_annotated() {
        let mut report = make_test_report();
        report.feedback[1].unscorable = true;
        assert!(generate_html(&report).contains("(unscorable)"));
    }

    #[test]
    fn html_report_write_to_file() {
        let report = make_test_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.html");

        write_html_report(&report, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }
}
