//! Line-oriented quiz loop over any reader and writer.

use std::io::{BufRead, Write};

use quiz_core::model::{Question, SessionResult};
use quiz_core::shaping::{TextDirection, direction};
use quiz_core::shape;
use services::{AnswerResult, QuizEngine};

use crate::AppError;

/// Column that right-aligned text ends at.
const DISPLAY_WIDTH: usize = 60;

/// Typing this instead of an answer abandons the quiz.
pub const QUIT_COMMAND: &str = ":q";

/// What the player typed for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Answer(String),
    Quit,
}

/// Interpret a raw line for `question`: `:q` quits, and on multiple-choice
/// questions a number `1..=n` selects the n-th choice. Anything else is
/// submitted verbatim.
#[must_use]
pub fn parse_input(line: &str, question: &Question) -> Input {
    let trimmed = line.trim();
    if trimmed == QUIT_COMMAND {
        return Input::Quit;
    }
    let picked = trimmed
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|idx| question.choices().get(idx));
    match picked {
        Some(choice) => Input::Answer(choice.clone()),
        None => Input::Answer(trimmed.to_owned()),
    }
}

pub struct Terminal<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Print one line of user-facing text, shaped for display. Lines whose
    /// base direction is right-to-left are right-aligned.
    fn say(&mut self, text: &str) -> Result<(), AppError> {
        for line in text.lines() {
            let shaped = shape(line);
            if direction(line) == TextDirection::RightToLeft {
                let pad = DISPLAY_WIDTH.saturating_sub(shaped.chars().count());
                writeln!(self.output, "{:pad$}{shaped}", "")?;
            } else {
                writeln!(self.output, "{shaped}")?;
            }
        }
        Ok(())
    }

    fn blank(&mut self) -> Result<(), AppError> {
        writeln!(self.output)?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>, AppError> {
        write!(self.output, "> ")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn show_question(&mut self, engine: &QuizEngine, question: &Question) -> Result<(), AppError> {
        let (position, total) = engine
            .progress()
            .map_or((0, 0), |p| (p.position(), p.total));
        let mut header = format!("[{position}/{total}]");
        if let Some(category) = question.category() {
            header.push_str(&format!(" {}", shape(category)));
        }
        if let Some(left) = engine.remaining_time() {
            header.push_str(&format!("  {}s", left.num_seconds()));
        }

        self.blank()?;
        writeln!(self.output, "{header}")?;
        self.say(question.prompt())?;
        for (idx, choice) in question.choices().iter().enumerate() {
            self.say(&format!("  {}) {choice}", idx + 1))?;
        }
        Ok(())
    }

    fn show_feedback(&mut self, answer: &AnswerResult) -> Result<(), AppError> {
        let expected = answer.correct_answers.join(" / ");
        if answer.timed_out {
            self.say(&format!("Time's up. Answer: {expected}"))
        } else if answer.is_correct {
            self.say("Correct!")
        } else if answer.credit > 0.0 {
            self.say(&format!(
                "Partly right ({:.0}%). Answer: {expected}",
                answer.credit * 100.0
            ))
        } else {
            self.say(&format!("Wrong. Answer: {expected}"))
        }
    }

    /// Ask every question of the engine's running session until it completes
    /// or the player quits. End of input abandons the session.
    ///
    /// # Errors
    ///
    /// Returns `AppError` on I/O failures or if no session is running.
    pub fn run(&mut self, engine: &mut QuizEngine) -> Result<SessionResult, AppError> {
        loop {
            let question = engine.current_question()?.clone();
            self.show_question(engine, &question)?;

            let Some(line) = self.read_line()? else {
                engine.abandon();
                break;
            };
            match parse_input(&line, &question) {
                Input::Quit => {
                    engine.abandon();
                    self.say("Quiz abandoned.")?;
                    break;
                }
                Input::Answer(text) => {
                    let answer = engine.submit_answer(&text)?;
                    self.show_feedback(&answer)?;
                    if answer.is_complete() {
                        break;
                    }
                }
            }
        }
        Ok(engine.result()?)
    }

    /// # Errors
    ///
    /// Returns `AppError::Io` if writing fails.
    pub fn show_result(&mut self, result: &SessionResult) -> Result<(), AppError> {
        self.blank()?;
        let verdict = if result.is_completed() {
            "Quiz complete"
        } else {
            "Quiz abandoned"
        };
        writeln!(
            self.output,
            "{verdict}: {}/{} correct, {} answered, score {:.1}%",
            result.correct_count(),
            result.total_questions(),
            result.answered(),
            result.score_value() * 100.0
        )?;
        Ok(())
    }
}
