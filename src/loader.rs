//! Utility functions for preparing memory for execution

use std::io::Read;

use log::debug;

use crate::error::SimulatorError;
use crate::error::SimulatorResult;
use crate::memory::main_memory::MainMemory;

/// Most words a program image may contain
pub const INPUT_WORD_LIMIT: usize = 256;

/// Parses whitespace-separated hexadecimal words.
/// An optional `0x` prefix is accepted on each word.
pub fn parse_hex_words(text: &str) -> SimulatorResult<Vec<u32>> {
    let mut words = Vec::new();
    for (index, token) in text.split_whitespace().enumerate() {
        if words.len() == INPUT_WORD_LIMIT {
            return Err(SimulatorError::LoadOverflow { limit: INPUT_WORD_LIMIT });
        }
        let digits = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);
        let word = u32::from_str_radix(digits, 16).map_err(|_| {
            SimulatorError::ParseError { index, token: token.to_string() }
        })?;
        words.push(word);
    }
    Ok(words)
}

/// Reads a whole program image from a reader
pub fn read_program(mut input: impl Read) -> SimulatorResult<Vec<u32>> {
    let mut text = String::new();
    input.read_to_string(&mut text)?;
    parse_hex_words(&text)
}

/// Places the program at word 0 onwards
pub fn load_program(mem: &mut MainMemory, words: &[u32]) -> SimulatorResult<()> {
    if words.len() > INPUT_WORD_LIMIT {
        return Err(SimulatorError::LoadOverflow { limit: INPUT_WORD_LIMIT });
    }
    for (index, word) in words.iter().enumerate() {
        mem.preload(index, *word)?;
    }
    debug!("Loaded {} words", words.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let words = parse_hex_words("14200004 0x0000000a\n\tFFFFFFFF\n0X1").unwrap();
        assert_eq!(words, vec![0x1420_0004, 0xa, 0xffff_ffff, 1]);
        assert!(parse_hex_words("   \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_hex_words("0 1 zz"),
            Err(SimulatorError::ParseError { index: 2, .. })
        ));
        // wider than a word
        assert!(parse_hex_words("100000000").is_err());
        assert!(parse_hex_words("0x").is_err());
    }

    #[test]
    fn test_word_limit() {
        let full = "0 ".repeat(INPUT_WORD_LIMIT);
        assert_eq!(parse_hex_words(&full).unwrap().len(), INPUT_WORD_LIMIT);

        let over = "0 ".repeat(INPUT_WORD_LIMIT + 1);
        assert!(matches!(
            parse_hex_words(&over),
            Err(SimulatorError::LoadOverflow { limit: INPUT_WORD_LIMIT })
        ));
    }

    #[test]
    fn test_load_program() {
        let mut mem = MainMemory::make();
        load_program(&mut mem, &[0xaa, 0xbb]).unwrap();
        assert_eq!(mem.peek(0), Some(0xaa));
        assert_eq!(mem.peek(4), Some(0xbb));
        assert_eq!(mem.history.writes, 0);

        let too_many = vec![1; INPUT_WORD_LIMIT + 1];
        assert!(load_program(&mut mem, &too_many).is_err());
        assert_eq!(mem.peek(8), Some(0));
    }

    #[test]
    fn test_read_program() {
        let words = read_program("5 6".as_bytes()).unwrap();
        assert_eq!(words, vec![5, 6]);
    }
}
