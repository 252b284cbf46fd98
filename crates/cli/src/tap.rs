use std::fmt;

/// Result of one fixture comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    /// Failure with a human-readable reason, possibly multi-line.
    Fail(String),
}

/// Fixture results in run order, rendered as a TAP 14 stream.
#[derive(Debug, Default)]
pub struct TapReport {
    checks: Vec<(String, Outcome)>,
}

impl TapReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pass(&mut self, name: impl Into<String>) {
        self.checks.push((name.into(), Outcome::Pass));
    }

    pub fn fail(&mut self, name: impl Into<String>, reason: impl Into<String>) {
        self.checks.push((name.into(), Outcome::Fail(reason.into())));
    }

    pub fn failed(&self) -> usize {
        self.checks
            .iter()
            .filter(|(_, o)| matches!(o, Outcome::Fail(_)))
            .count()
    }
}

impl fmt::Display for TapReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TAP version 14")?;
        writeln!(f, "1..{}", self.checks.len())?;
        for (n, (name, outcome)) in (1..).zip(&self.checks) {
            match outcome {
                Outcome::Pass => writeln!(f, "ok {} - {}", n, name)?,
                Outcome::Fail(reason) => {
                    writeln!(f, "not ok {} - {}", n, name)?;
                    writeln!(f, "  ---")?;
                    writeln!(f, "  message: |")?;
                    for line in reason.lines() {
                        writeln!(f, "    {}", line)?;
                    }
                    writeln!(f, "  ...")?;
                }
            }
        }
        let failed = self.failed();
        writeln!(f, "# pass {}", self.checks.len() - failed)?;
        writeln!(f, "# fail {}", failed)
    }
}
