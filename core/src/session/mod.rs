mod parsing_session;

pub use parsing_session::ParsingSession;

#[cfg(test)]
mod session_tests;
