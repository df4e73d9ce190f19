use std::fmt;

/// Ordered messages collected while loading configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Warnings(Vec<String>);

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message and mirror it to the log.
    pub fn push(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        log::warn!(target: "brushes", "{}", msg);
        self.0.push(msg);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl fmt::Display for Warnings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for w in &self.0 {
            writeln!(f, "warning: {w}")?;
        }
        Ok(())
    }
}
