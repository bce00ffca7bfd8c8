use std::io::{self, BufRead, Write};

use crate::result::Result;

/// Source of the operator's decisions.
///
/// `choose` must return one of `options`. The last option is the conservative one
/// (exit, no) and is used when no answer can be obtained anymore.
pub trait Operator {
    fn choose(&mut self, prompt: &str, options: &[char]) -> Result<char>;
}

/// Ask the operator on the terminal
pub struct StdinOperator<R, W> {
    input: R,
    output: W,
}

impl StdinOperator<io::StdinLock<'static>, io::Stdout> {
    pub fn new() -> Self {
        Self {
            input: io::stdin().lock(),
            output: io::stdout(),
        }
    }
}

impl<R: BufRead, W: Write> StdinOperator<R, W> {
    pub fn with_io(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Operator for StdinOperator<R, W> {
    fn choose(&mut self, prompt: &str, options: &[char]) -> Result<char> {
        let fallback = options.last().copied().unwrap_or('e');

        loop {
            write!(self.output, "{prompt}")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                return Ok(fallback);
            }

            let text = line.trim().to_lowercase();
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if options.contains(&c) => return Ok(c),
                _ => writeln!(self.output, "`{text}` is not a valid option")?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ask(input: &str, options: &[char]) -> (char, String) {
        let mut output = vec![];
        let choice = StdinOperator::with_io(input.as_bytes(), &mut output)
            .choose("(y)es, (n)o: ", options)
            .unwrap();
        (choice, String::from_utf8(output).unwrap())
    }

    #[test]
    fn accept_valid_answer_in_any_case() {
        assert_eq!(ask("Y\n", &['y', 'n']).0, 'y');
    }

    #[test]
    fn reprompt_until_valid() {
        let (choice, output) = ask("maybe\n\ns\nn\n", &['y', 'n']);
        assert_eq!(choice, 'n');
        assert_eq!(output.matches("(y)es, (n)o: ").count(), 4);
        assert!(output.contains("`maybe` is not a valid option"));
        assert!(output.contains("`s` is not a valid option"));
    }

    #[test]
    fn end_of_input_picks_last_option() {
        assert_eq!(ask("", &['d', 's', 'e']).0, 'e');
    }
}
