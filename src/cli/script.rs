//! Line loop shared by stdin, script files and one-shot commands.

use std::io::{BufRead, Write};

use crate::command::{parse_line, verb_of};
use crate::error::Result;
use crate::output::{emit_error, emit_success, render, OutputOptions};
use crate::session::{Response, Session};

/// Execute commands line by line. Failures are reported and the loop goes on;
/// `Quit` or end of input stops it.
pub(super) fn run_lines<R: BufRead>(
    session: &mut Session,
    reader: R,
    options: OutputOptions,
    prompt: bool,
) -> anyhow::Result<()> {
    let mut lines = reader.lines();
    loop {
        if prompt {
            print!("> ");
            std::io::stdout().flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        match execute_line(session, &line, options) {
            Ok(Some(Response::Quit)) => break,
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(line = %line, error = %err, "command failed");
                emit_error(verb_of(&line), &err, options.json)?;
            }
        }
    }
    Ok(())
}

/// Execute one command given on the command line. Errors propagate so the
/// process exit code reflects them.
pub(super) fn run_single(session: &mut Session, line: &str, options: OutputOptions) -> anyhow::Result<()> {
    execute_line(session, line, options)?;
    Ok(())
}

fn execute_line(session: &mut Session, line: &str, options: OutputOptions) -> Result<Option<Response>> {
    let Some(request) = parse_line(line)? else {
        return Ok(None);
    };
    let verb = request.verb();
    let response = session.execute(request)?;
    if !matches!(response, Response::Quit) {
        emit_success(options, verb, &response, Some(&render(&response)))?;
    }
    Ok(Some(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn failures_do_not_stop_the_loop() {
        let mut session = Session::new(&Config::default());
        let input = "CreatePrimitiveTask A a 1 ,\nDeleteTask Nope\nBogus\nCreatePrimitiveTask B b 2 A\n";
        let options = OutputOptions {
            json: false,
            quiet: true,
        };

        run_lines(&mut session, input.as_bytes(), options, false).unwrap();
        assert!(session.store().contains_task("A"));
        assert!(session.store().contains_task("B"));
    }

    #[test]
    fn quit_stops_reading() {
        let mut session = Session::new(&Config::default());
        let input = "CreatePrimitiveTask A a 1 ,\nQuit\nCreatePrimitiveTask B b 2 ,\n";
        let options = OutputOptions {
            json: false,
            quiet: true,
        };

        run_lines(&mut session, input.as_bytes(), options, false).unwrap();
        assert!(session.store().contains_task("A"));
        assert!(!session.store().contains_task("B"));
    }

    #[test]
    fn single_command_errors_propagate() {
        let mut session = Session::new(&Config::default());
        let options = OutputOptions::default();
        let err = run_single(&mut session, "ReportDuration Nope", options).unwrap_err();
        assert!(err.downcast_ref::<crate::error::Error>().is_some());
    }
}
