use std::fmt;
use std::path::PathBuf;

use crate::args::argument::{Argument, Placement};
use crate::args::collection::{Arguments, Input, Output};
use crate::foundation::config::EngineConfig;
use crate::foundation::error::FfResult;

/// Reserved input token for the engine's stdin.
pub const STDIN_PIPE: &str = "pipe:0";
/// Reserved output token for the engine's stdout.
pub const STDOUT_PIPE: &str = "pipe:1";

/// Fully ordered invocation: resolved program plus its argument tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLine {
    /// Engine binary.
    pub program: PathBuf,
    /// Tokens, in order.
    pub args: Vec<String>,
}

impl CommandLine {
    /// Validate `arguments` and render the invocation.
    ///
    /// Order: pre-input arguments, then each input (pipe stream declaration + `-i`), then
    /// post-input arguments, then the output. Filter arguments merge into one `-vf` chain at the
    /// position of the first one.
    pub fn render(arguments: &Arguments, config: &EngineConfig) -> FfResult<Self> {
        arguments.validate()?;

        let mut args = Vec::new();
        push_placed(&mut args, arguments.arguments(), Placement::PreInput);
        for input in arguments.inputs() {
            match input {
                Input::File(path) => {
                    args.push("-i".to_string());
                    args.push(path.to_string_lossy().into_owned());
                }
                Input::Pipe(source) => {
                    args.extend(source.stream_args());
                    args.push("-i".to_string());
                    args.push(STDIN_PIPE.to_string());
                }
            }
        }
        push_placed(&mut args, arguments.arguments(), Placement::PostInput);
        match arguments.output() {
            Some(Output::File { path, overwrite }) => {
                args.push(if *overwrite { "-y" } else { "-n" }.to_string());
                args.push(path.to_string_lossy().into_owned());
            }
            Some(Output::Pipe(sink)) => {
                args.extend(sink.stream_args());
                args.push(STDOUT_PIPE.to_string());
            }
            // validate() rejects a missing output.
            None => {}
        }

        Ok(Self {
            program: config.ffmpeg_path(),
            args,
        })
    }
}

fn push_placed(out: &mut Vec<String>, arguments: &[Argument], placement: Placement) {
    let placed = move || arguments.iter().filter(move |a| a.placement() == placement);
    let filters: Vec<String> = placed().filter_map(Argument::filter_expression).collect();
    let mut filters_emitted = false;
    for arg in placed() {
        if arg.filter_expression().is_some() {
            if !filters_emitted {
                out.push("-vf".to_string());
                out.push(filters.join(","));
                filters_emitted = true;
            }
            continue;
        }
        out.extend(arg.render());
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg.replace('"', "\\\""))?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/args/command.rs"]
mod tests;
