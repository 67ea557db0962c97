//! The interactive prompt.

use rustyline::Context;
use rustyline::Editor;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};

use crate::env::{Env, EnvRef};
use crate::interp::Interp;
use crate::symbol::SPECIAL_FORMS;

/// Completion over the special forms and every name visible from the
/// REPL frame. Candidates are collected per keystroke, so names bound at
/// the prompt complete too.
struct LithHelper {
    env: EnvRef,
}

impl rustyline::Helper for LithHelper {}

impl Hinter for LithHelper {
    type Hint = String;
    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for LithHelper {}

impl Validator for LithHelper {
    fn validate(
        &self,
        _ctx: &mut ValidationContext,
    ) -> Result<ValidationResult, ReadlineError> {
        Ok(ValidationResult::Valid(None))
    }
}

impl Completer for LithHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> Result<(usize, Vec<Pair>), ReadlineError> {
        let start = line[..pos]
            .rfind(|c: char| c.is_whitespace() || matches!(c, '(' | ')' | '\'' | '`' | ','))
            .map_or(0, |i| i + 1);
        let word = &line[start..pos];

        let mut names: Vec<String> = SPECIAL_FORMS.keys().map(|name| name.to_string()).collect();
        Env::visible_names(&self.env, &mut names);
        names.sort();
        names.dedup();

        let matches = names
            .into_iter()
            .filter(|name| name.starts_with(word))
            .map(|name| Pair {
                display: name.clone(),
                replacement: name,
            })
            .collect();
        Ok((start, matches))
    }
}

/// Run the prompt until end of input. Each line is evaluated like a
/// top-level string; errors are reported and cleared before the next
/// prompt.
pub fn run(interp: &mut Interp, env: &EnvRef) {
    interp.filename = "<<stdin>>".to_string();
    let mut rl: Editor<LithHelper, rustyline::history::DefaultHistory> = match Editor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("lith: could not start the line editor: {e}");
            return;
        }
    };
    rl.set_helper(Some(LithHelper { env: env.clone() }));

    loop {
        match rl.readline("lith> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());
                if let Err(e) = interp.run_string(env, &line, false) {
                    interp.report(&e);
                    // A failed (load ...) leaves the reporter blaming the
                    // loaded file; the next line is stdin again.
                    interp.filename = "<<stdin>>".to_string();
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => {
                println!("Bye!");
                break;
            }
            Err(e) => {
                eprintln!("lith: readline error: {e}");
                break;
            }
        }
    }
}
