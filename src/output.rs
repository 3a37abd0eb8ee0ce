use std::fmt;

/// String buffer for generated code.
///
/// Writing into a `String` cannot fail, so `write!` and `writeln!` on this
/// type return `()` instead of `fmt::Result`.
pub struct Output(String);

impl Output {
    pub fn new() -> Self {
        Output(String::new())
    }

    pub fn write_fmt(&mut self, arguments: fmt::Arguments) {
        fmt::Write::write_fmt(&mut self.0, arguments).unwrap();
    }

    /// Writes `depth` tab characters.
    pub fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.0.push('\t');
        }
    }

    pub fn push_str(&mut self, s: &str) {
        self.0.push_str(s);
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Default for Output {
    fn default() -> Self {
        Output::new()
    }
}

impl AsRef<[u8]> for Output {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}
