//! Destination for `print` output.
//!
//! Enum dispatch rather than a trait object: the set of sinks is closed and
//! `print` sits on the evaluator's hot path.

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PrintHandler {
    /// Write each line to stdout.
    #[default]
    Stdout,
    /// Capture lines in memory (tests, embedding hosts).
    Buffer(String),
    /// Discard everything. Used for trial evaluation in the optimizer.
    Silent,
}

impl PrintHandler {
    pub fn buffer() -> Self {
        PrintHandler::Buffer(String::new())
    }

    /// Emit one line.
    pub fn println(&mut self, msg: &str) {
        match self {
            PrintHandler::Stdout => println!("{msg}"),
            PrintHandler::Buffer(buf) => {
                buf.push_str(msg);
                buf.push('\n');
            }
            PrintHandler::Silent => {}
        }
    }

    /// Everything captured so far; empty for sinks that don't capture.
    pub fn captured(&self) -> &str {
        match self {
            PrintHandler::Buffer(buf) => buf,
            PrintHandler::Stdout | PrintHandler::Silent => "",
        }
    }

    pub fn clear(&mut self) {
        if let PrintHandler::Buffer(buf) = self {
            buf.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_captures_lines() {
        let mut out = PrintHandler::buffer();
        out.println("a");
        out.println("b");
        assert_eq!(out.captured(), "a\nb\n");
        out.clear();
        assert_eq!(out.captured(), "");
    }

    #[test]
    fn silent_discards() {
        let mut out = PrintHandler::Silent;
        out.println("gone");
        assert_eq!(out.captured(), "");
    }
}
