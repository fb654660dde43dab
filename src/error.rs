/// Errors that can end a brainbox run.
#[derive(Debug, thiserror::Error)]
pub enum BrainboxError {
    /// The user pressed Ctrl-C while the program was waiting for input or running.
    #[error("Interrupted")]
    Interrupted,

    /// The instruction pointer landed on a code that is not a character.
    #[error("Undecodable instruction {code:#x} at ({x}, {y})")]
    Undecodable { code: u32, x: usize, y: usize },

    /// The input or output device failed.
    #[error("I/O error at step {step}: {source}")]
    Io {
        step: usize,
        #[source]
        source: std::io::Error,
    },

    /// Execution aborted due to step limit.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize },

    /// Execution aborted due to cooperative cancellation.
    #[error("Execution aborted: cancelled")]
    Canceled,
}
