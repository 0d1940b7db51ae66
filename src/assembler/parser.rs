//! The Parser module takes the normalized line stream from the lexer
//! and resolves each line to an Instruction.
use std::io;

use regex::Regex;

use super::ast::*;
use super::error::AssemblyError;
use super::lexer::Line;

/// A resolved instruction and the source line it came from.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Statement {
    pub line: usize,
    pub instruction: Instruction,
}

pub struct Parser<I> {
    lines: I,
    operand: Regex,
    failed: bool,
}

impl<I> Parser<I>
where
    I: Iterator<Item = io::Result<Line>>,
{
    pub fn new(lines: I) -> Self {
        Parser { lines, operand: operand_regex(), failed: false }
    }
}

impl<I> Iterator for Parser<I>
where
    I: Iterator<Item = io::Result<Line>>,
{
    type Item = Result<Statement, AssemblyError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let result = match self.lines.next()? {
            Ok(line) => match resolve(&self.operand, &line.text) {
                Some(instruction) => {
                    debug!("line {}: `{}` => {}", line.number, line.text, instruction);
                    Ok(Statement { line: line.number, instruction })
                }
                None => Err(AssemblyError::InvalidExpression { line: line.number, text: line.text }),
            },
            Err(e) => Err(AssemblyError::from(e)),
        };

        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

/// Matches the leading decimal integer of a `push` operand:
/// optional whitespace, an optional sign, then digits.
fn operand_regex() -> Regex {
    Regex::new(r"^\s*([+-]?[0-9]+)").expect("push operand pattern is a valid regex")
}

/// Resolves one normalized line. Lines beginning with `push` never
/// fall back to the mnemonic table, even when malformed.
fn resolve(operand: &Regex, line: &str) -> Option<Instruction> {
    if line.starts_with("push") {
        push(operand, line)
    } else {
        Instruction::from_mnemonic(line)
    }
}

fn push(operand: &Regex, line: &str) -> Option<Instruction> {
    let hash = line.find('#')?;
    let digits = operand.captures(&line[hash + 1..])?.get(1)?.as_str();
    // Anything that overflows i64 is out of range anyway.
    let value = digits.parse::<i64>().ok()?;
    if (0..=0x0F).contains(&value) {
        Some(Instruction::Push(value as Immediate))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn res(line: &str) -> Option<Instruction> {
        resolve(&operand_regex(), line)
    }

    fn parse(lines: Vec<io::Result<Line>>) -> Vec<Result<Statement, AssemblyError>> {
        Parser::new(lines.into_iter()).collect()
    }

    fn ok_line(number: usize, text: &str) -> io::Result<Line> {
        Ok(Line { number, text: text.to_owned() })
    }

    #[test]
    fn test_resolve_mnemonics() {
        for (name, ins) in MNEMONICS.iter() {
            assert_eq!(res(name), Some(*ins));
        }
        assert_eq!(res("add"), Some(Instruction::Add));
        assert_eq!(res("br"), Some(Instruction::Br));

        assert_eq!(res("banana"), None);
        assert_eq!(res("add pop"), None);
        assert_eq!(res("addx"), None);
        assert_eq!(res("ad"), None);
    }

    #[test]
    fn test_resolve_push() {
        for i in 0..=15u8 {
            assert_eq!(res(&format!("push #{}", i)), Some(Instruction::Push(i)));
        }
        assert_eq!(res("push#7"), Some(Instruction::Push(7)));
        assert_eq!(res("push # 7"), Some(Instruction::Push(7)));
        assert_eq!(res("push #+7"), Some(Instruction::Push(7)));
        assert_eq!(res("push #-0"), Some(Instruction::Push(0)));
        assert_eq!(res("push #007"), Some(Instruction::Push(7)));
        // Only the leading integer is read.
        assert_eq!(res("push #12abc"), Some(Instruction::Push(12)));
        assert_eq!(res("push #3 #9"), Some(Instruction::Push(3)));
        // The prefix alone routes to the push path.
        assert_eq!(res("pushy #2"), Some(Instruction::Push(2)));
    }

    #[test]
    fn test_resolve_bad_push() {
        assert_eq!(res("push"), None);
        assert_eq!(res("push 5"), None);
        assert_eq!(res("push #"), None);
        assert_eq!(res("push #x"), None);
        assert_eq!(res("push #16"), None);
        assert_eq!(res("push #-1"), None);
        assert_eq!(res("push #+-1"), None);
        assert_eq!(res("push #99999999999999999999999"), None);
        // Malformed pushes never resolve to a bare mnemonic.
        assert_eq!(res("pushand"), None);
    }

    #[test]
    fn test_parser() {
        let out = parse(vec![ok_line(1, "push #4"), ok_line(3, "dup")]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].as_ref().unwrap(), &Statement { line: 1, instruction: Instruction::Push(4) });
        assert_eq!(out[1].as_ref().unwrap(), &Statement { line: 3, instruction: Instruction::Dup });
    }

    #[test]
    fn test_parser_stops_at_first_error() {
        let out = parse(vec![ok_line(1, "and"), ok_line(2, "banana"), ok_line(3, "pop")]);
        assert_eq!(out.len(), 2);
        assert!(out[0].is_ok());
        match &out[1] {
            Err(AssemblyError::InvalidExpression { line, text }) => {
                assert_eq!(*line, 2);
                assert_eq!(text, "banana");
            }
            other => panic!("expected an invalid expression, got {:?}", other),
        }
    }

    #[test]
    fn test_parser_read_error() {
        let out = parse(vec![
            Err(io::Error::new(io::ErrorKind::InvalidData, "bad read")),
            ok_line(2, "pop"),
        ]);
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0], Err(AssemblyError::Read(_))));
    }
}
