/// Drops a raw line when it is byte-identical to the line just before it.
///
/// Some client builds write the same line twice in a row; a one-line lookback
/// is enough to undo that.
#[derive(Debug, Default)]
pub struct Dedup {
    last: Option<String>,
}

impl Dedup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the line should be processed.
    pub fn accept(&mut self, line: &str) -> bool {
        if self.last.as_deref() == Some(line) {
            return false;
        }
        let last = self.last.get_or_insert_with(String::new);
        last.clear();
        last.push_str(line);
        true
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
