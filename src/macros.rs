//! Public macros for building chat messages
//!
//! Exported at crate root via `#[macro_export]`.

/// Creates a user message
#[macro_export]
macro_rules! user {
    ($content:expr) => {
        $crate::types::ChatMessage::user($content)
    };
}

/// Creates a system message
#[macro_export]
macro_rules! system {
    ($content:expr) => {
        $crate::types::ChatMessage::system($content)
    };
}

/// Creates an assistant message
#[macro_export]
macro_rules! assistant {
    ($content:expr) => {
        $crate::types::ChatMessage::assistant($content)
    };
}

/// Creates a message with an arbitrary role, e.g. `message!("tool", "42")`
#[macro_export]
macro_rules! message {
    ($role:expr, $content:expr) => {
        $crate::types::ChatMessage::new($role, $content)
    };
}

/// Creates a `Vec<ChatMessage>`
#[macro_export]
macro_rules! messages {
    ($($msg:expr),* $(,)?) => {
        vec![$($msg),*]
    };
}
