/// Tunables for a [`Program`](crate::Program).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Deepest allowed chain of nested function calls
    pub max_call_depth: usize,
    /// Run the dead-prefix pass on statements and function bodies
    pub optimize: bool,
}

impl InterpreterConfig {
    pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_call_depth: Self::DEFAULT_MAX_CALL_DEPTH,
            optimize: true,
        }
    }
}
